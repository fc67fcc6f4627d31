use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{BlobPath, ReviewPatch, SubmissionId, SubmissionRecord};

/// Document storage for submissions so the service can be exercised in isolation.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError>;
    /// Every stored submission, most recently submitted first.
    async fn list_recent(&self) -> Result<Vec<SubmissionRecord>, RepositoryError>;
    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
    /// Apply a reviewer patch in place. Unknown ids yield `NotFound` and create nothing.
    async fn apply_review(
        &self,
        id: &SubmissionId,
        patch: &ReviewPatch,
        at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Binary storage for the uploaded video and payment proof.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn write(
        &self,
        path: &BlobPath,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, BlobError>;
}

/// Location of a blob after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub path: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("invalid blob path '{0}'")]
    InvalidPath(String),
    #[error("blob storage unavailable: {0}")]
    Unavailable(String),
}

/// Outbound confirmation hook (e-mail in production, recorders in tests).
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotificationError>;
}

/// Who to thank for which submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationNotice {
    pub to: String,
    pub display_name: String,
    pub submission_id: SubmissionId,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("email service not configured")]
    NotConfigured,
    #[error("email transport failed: {0}")]
    Transport(String),
    #[error("email provider rejected the message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}
