use crate::infra::blob_store;
use audition_portal::config::{check_required_variables, AppConfig, ConfigError, VariableState};
use audition_portal::error::AppError;
use audition_portal::workflows::auditions::{
    write_submissions_csv, AuditionService, BlobStore, ConfirmationSender, DisabledSender,
    JsonFileSubmissionRepository, LocalBlobStore, ReviewFilter, ReviewPatch, ReviewQueue,
    StatusFilter, SubmissionId, SubmissionRepository, SubmissionStatus,
};
use clap::Args;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

type OfflineService = AuditionService<JsonFileSubmissionRepository, LocalBlobStore, DisabledSender>;

#[derive(Args, Debug, Default)]
pub(crate) struct CheckEnvArgs {
    /// Only print variables that still need a value
    #[arg(long)]
    pub(crate) missing_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FilterArgs {
    /// Status to show: all, pending, reviewed, selected, or rejected
    #[arg(long, default_value = "all")]
    pub(crate) status: String,
    /// Case-insensitive match on first name, last name, email, or region
    #[arg(long)]
    pub(crate) search: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<ReviewFilter, AppError> {
        let status = self.status.parse::<StatusFilter>()?;
        Ok(ReviewFilter::new(
            status,
            self.search.clone().unwrap_or_default(),
        ))
    }
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
}

#[derive(Args, Debug)]
pub(crate) struct SetStatusArgs {
    /// Submission identifier
    pub(crate) id: String,
    /// New status: pending, reviewed, selected, or rejected
    pub(crate) status: SubmissionStatus,
    /// Replacement reviewer notes; existing notes are kept when omitted
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
    /// Destination file (defaults to stdout)
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_check_env(args: CheckEnvArgs) -> Result<(), AppError> {
    let loaded = AppConfig::load();
    check_environment(&args, loaded, |key| std::env::var(key).ok())
}

fn check_environment<F>(
    args: &CheckEnvArgs,
    loaded: Result<AppConfig, ConfigError>,
    lookup: F,
) -> Result<(), AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let checks = check_required_variables(lookup);

    println!("Environment check");
    for check in &checks {
        let label = match check.state {
            VariableState::Set if args.missing_only => continue,
            VariableState::Set => "set",
            VariableState::Missing => "MISSING",
            VariableState::Placeholder => "PLACEHOLDER",
        };
        println!("- {:<22} {}", check.name, label);
    }

    let ready = checks
        .iter()
        .filter(|check| check.state == VariableState::Set)
        .count();
    println!("{ready} of {} required variables set", checks.len());

    let config = loaded?;
    println!("Configuration loads for {:?}", config.environment);
    if config.review.uses_development_password {
        println!("  Reviewer login uses the development password");
    }
    if !config.mail.is_configured() {
        println!("  Confirmation emails are disabled");
    }

    let unset: Vec<_> = checks
        .iter()
        .filter(|check| check.state != VariableState::Set)
        .map(|check| check.name)
        .collect();
    if unset.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingVariables(unset).into())
    }
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = offline_service(&config);
    let queue = service.review_queue(&args.filter.to_filter()?).await?;
    print!("{}", render_queue(&queue));
    Ok(())
}

pub(crate) async fn run_set_status(args: SetStatusArgs) -> Result<(), AppError> {
    let SetStatusArgs { id, status, notes } = args;
    let config = AppConfig::load()?;
    let service = offline_service(&config);

    let record = service
        .update_status(&SubmissionId(id), ReviewPatch::new(status, notes))
        .await?;
    println!(
        "- {} -> {} (notes: {})",
        record.id,
        record.status,
        if record.notes.is_empty() {
            "none"
        } else {
            record.notes.as_str()
        }
    );
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = offline_service(&config);
    let filter = args.filter.to_filter()?;

    match args.output {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            let count = export_queue(&service, &filter, file).await?;
            println!("Exported {count} submissions to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            export_queue(&service, &filter, stdout.lock()).await?;
        }
    }
    Ok(())
}

fn offline_service(config: &AppConfig) -> OfflineService {
    AuditionService::new(
        Arc::new(JsonFileSubmissionRepository::new(
            config.storage.submissions_file.clone(),
        )),
        Arc::new(blob_store(config)),
        Arc::new(DisabledSender),
        config.intake.clone(),
    )
}

async fn export_queue<R, B, N, W>(
    service: &AuditionService<R, B, N>,
    filter: &ReviewFilter,
    writer: W,
) -> Result<usize, AppError>
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
    W: Write,
{
    let queue = service.review_queue(filter).await?;
    write_submissions_csv(writer, &queue.submissions)?;
    Ok(queue.submissions.len())
}

fn render_queue(queue: &ReviewQueue) -> String {
    let stats = &queue.stats;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Submissions: total {} | pending {} | reviewed {} | selected {} | rejected {}",
        stats.total, stats.pending, stats.reviewed, stats.selected, stats.rejected
    );

    if queue.submissions.is_empty() {
        let _ = writeln!(out, "No submissions match the filter");
        return out;
    }

    for record in &queue.submissions {
        let applicant = &record.applicant;
        let _ = writeln!(
            out,
            "- {} | {} | {} | {} <{}> | {}",
            record.id,
            record.submitted_at.format("%Y-%m-%d %H:%M"),
            record.status,
            applicant.display_name(),
            applicant.email,
            applicant.region
        );
        if !record.notes.is_empty() {
            let _ = writeln!(out, "    notes: {}", record.notes);
        }
    }
    out
}
