use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::auditions::IntakePolicy;

const DEVELOPMENT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 8 * 60;
const DEFAULT_MAIL_ENDPOINT: &str = "https://api.zeptomail.com/v1.1/email";
const DEFAULT_COMPETITION_NAME: &str = "Regional Shift Competition";

/// Variables a production deployment is expected to set explicitly.
pub const REQUIRED_VARIABLES: &[&str] = &[
    "ADMIN_PASSWORD",
    "PUBLIC_BASE_URL",
    "STORAGE_ROOT",
    "ZEPTOMAIL_API_KEY",
    "ZEPTOMAIL_FROM_EMAIL",
    "ZEPTOMAIL_FROM_NAME",
];

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the portal.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub review: ReviewConfig,
    pub storage: StorageConfig,
    pub intake: IntakePolicy,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `load` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment =
            AppEnvironment::from_str(&var("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("APP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = match var("APP_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::Compact,
        };

        let (admin_password, default_password) = match var("ADMIN_PASSWORD") {
            Some(password) => (password, false),
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingAdminPassword)
            }
            None => (DEVELOPMENT_ADMIN_PASSWORD.to_string(), true),
        };
        let session_ttl_minutes =
            parse_number(&var, "ADMIN_SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidNumber {
                key: "ADMIN_SESSION_TTL_MINUTES",
                value: session_ttl_minutes.to_string(),
            });
        }

        let storage_root = PathBuf::from(var("STORAGE_ROOT").unwrap_or_else(|| "./data".to_string()));
        let submissions_file = var("SUBMISSIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| storage_root.join("submissions.json"));
        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let defaults = IntakePolicy::default();
        let intake = IntakePolicy::with_upload_limits(
            parse_number(&var, "MAX_VIDEO_BYTES", defaults.max_video_bytes)?,
            parse_number(&var, "MAX_PROOF_BYTES", defaults.max_proof_bytes)?,
        );

        let mail = MailConfig {
            api_key: var("ZEPTOMAIL_API_KEY"),
            from_address: var("ZEPTOMAIL_FROM_EMAIL"),
            from_name: var("ZEPTOMAIL_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_COMPETITION_NAME.to_string()),
            endpoint: var("ZEPTOMAIL_ENDPOINT").unwrap_or_else(|| DEFAULT_MAIL_ENDPOINT.to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            review: ReviewConfig {
                admin_password,
                uses_development_password: default_password,
                session_ttl_minutes,
            },
            storage: StorageConfig {
                root: storage_root,
                submissions_file,
                public_base_url,
            },
            intake,
            mail,
        })
    }
}

fn parse_number<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Reviewer gate settings.
#[derive(Clone)]
pub struct ReviewConfig {
    pub admin_password: String,
    pub uses_development_password: bool,
    pub session_ttl_minutes: i64,
}

impl fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("admin_password", &"<redacted>")
            .field("uses_development_password", &self.uses_development_password)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish()
    }
}

/// Where uploads and the submission document live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub submissions_file: PathBuf,
    pub public_base_url: String,
}

/// Transactional e-mail settings. Mail is sent only when both key and sender are present.
#[derive(Clone)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub endpoint: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.from_address.is_some()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// State of one required variable as reported by `check-env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableState {
    Set,
    Missing,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableCheck {
    pub name: &'static str,
    pub state: VariableState,
}

/// Inspect every required variable. Template values such as `your_key_here` count as unset.
pub fn check_required_variables<F>(lookup: F) -> Vec<VariableCheck>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARIABLES
        .iter()
        .map(|&name| {
            let state = match lookup(name) {
                None => VariableState::Missing,
                Some(value) if value.trim().is_empty() => VariableState::Missing,
                Some(value) if value.contains("your_") || value.contains("_here") => {
                    VariableState::Placeholder
                }
                Some(_) => VariableState::Set,
            };
            VariableCheck { name, state }
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidLogFormat(String),
    MissingAdminPassword,
    MissingVariables(Vec<&'static str>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { source } => {
                write!(f, "APP_HOST must be an IP address or 'localhost' ({source})")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive number, found '{value}'")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', found '{value}'")
            }
            ConfigError::MissingAdminPassword => {
                write!(f, "ADMIN_PASSWORD must be set in production")
            }
            ConfigError::MissingVariables(names) => {
                write!(
                    f,
                    "required variables missing or not configured: {}",
                    names.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::MissingAdminPassword
            | ConfigError::MissingVariables(_) => None,
        }
    }
}
