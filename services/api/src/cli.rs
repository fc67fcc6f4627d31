use crate::review::{run_check_env, run_export, run_list, run_set_status};
use crate::review::{CheckEnvArgs, ExportArgs, ListArgs, SetStatusArgs};
use crate::server;
use audition_portal::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Audition Portal",
    about = "Run the audition intake service and review submissions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Report which required environment variables are set
    CheckEnv(CheckEnvArgs),
    /// Inspect and update stored submissions without the web dashboard
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewCommand {
    /// List submissions, newest first, with dashboard counters
    List(ListArgs),
    /// Move a submission to a new status, optionally replacing its notes
    SetStatus(SetStatusArgs),
    /// Write submissions as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::CheckEnv(args) => run_check_env(args),
        Command::Review { command } => match command {
            ReviewCommand::List(args) => run_list(args).await,
            ReviewCommand::SetStatus(args) => run_set_status(args).await,
            ReviewCommand::Export(args) => run_export(args).await,
        },
    }
}
