use async_trait::async_trait;
use audition_portal::config::{AppConfig, MailConfig, ReviewConfig};
use audition_portal::workflows::auditions::{
    AuditionService, ConfirmationNotice, ConfirmationSender, DisabledSender,
    JsonFileSubmissionRepository, LocalBlobStore, NotificationError, ReviewerGate,
    ZeptoMailSender,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

pub(crate) type PortalService =
    AuditionService<JsonFileSubmissionRepository, LocalBlobStore, ConfiguredSender>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) uploads: Arc<LocalBlobStore>,
}

/// Confirmation sender picked at startup from the mail settings.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredSender {
    ZeptoMail(ZeptoMailSender),
    Disabled(DisabledSender),
}

impl ConfiguredSender {
    pub(crate) fn from_config(config: &MailConfig) -> Self {
        if !config.is_configured() {
            warn!("ZEPTOMAIL_API_KEY or ZEPTOMAIL_FROM_EMAIL unset; confirmation emails disabled");
            return Self::Disabled(DisabledSender);
        }

        match ZeptoMailSender::from_config(config) {
            Ok(sender) => Self::ZeptoMail(sender),
            Err(err) => {
                warn!(error = %err, "mail client unavailable; confirmation emails disabled");
                Self::Disabled(DisabledSender)
            }
        }
    }
}

#[async_trait]
impl ConfirmationSender for ConfiguredSender {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotificationError> {
        match self {
            Self::ZeptoMail(sender) => sender.send(notice).await,
            Self::Disabled(sender) => sender.send(notice).await,
        }
    }
}

pub(crate) fn blob_store(config: &AppConfig) -> LocalBlobStore {
    LocalBlobStore::new(
        config.storage.root.join("uploads"),
        config.storage.public_base_url.clone(),
    )
}

pub(crate) fn build_service(config: &AppConfig, blobs: Arc<LocalBlobStore>) -> PortalService {
    let repository = Arc::new(JsonFileSubmissionRepository::new(
        config.storage.submissions_file.clone(),
    ));
    let sender = Arc::new(ConfiguredSender::from_config(&config.mail));
    AuditionService::new(repository, blobs, sender, config.intake.clone())
}

pub(crate) fn build_gate(config: &ReviewConfig) -> ReviewerGate {
    if config.uses_development_password {
        warn!("ADMIN_PASSWORD unset; using the development reviewer password");
    }
    ReviewerGate::new(
        config.admin_password.clone(),
        chrono::Duration::minutes(config.session_ttl_minutes),
    )
}
