use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    BlobPath, IntakeForm, ReviewPatch, SubmissionId, SubmissionRecord, UploadRole, UploadedFile,
};
use super::filter::{ReviewFilter, SubmissionStats};
use super::repository::{
    BlobError, BlobStore, ConfirmationNotice, ConfirmationSender, RepositoryError, StoredBlob,
    SubmissionRepository,
};
use super::validation::{IntakePolicy, IntakeValidator, ValidationError};

/// Service composing the intake validator, document store, blob store, and confirmation sender.
pub struct AuditionService<R, B, N> {
    validator: IntakeValidator,
    repository: Arc<R>,
    blobs: Arc<B>,
    notifier: Arc<N>,
}

/// Filtered submissions plus dashboard counters over the full list.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQueue {
    pub submissions: Vec<SubmissionRecord>,
    pub stats: SubmissionStats,
}

impl<R, B, N> AuditionService<R, B, N>
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    pub fn new(repository: Arc<R>, blobs: Arc<B>, notifier: Arc<N>, policy: IntakePolicy) -> Self {
        Self {
            validator: IntakeValidator::with_policy(policy),
            repository,
            blobs,
            notifier,
        }
    }

    pub fn policy(&self) -> &IntakePolicy {
        self.validator.policy()
    }

    /// Validate, store both uploads, persist the record, then send the confirmation.
    ///
    /// Nothing is written when validation fails. Uploads that succeed before a later
    /// failure are left in place. A failed confirmation is logged and does not affect
    /// the returned record.
    pub async fn submit(&self, form: IntakeForm) -> Result<SubmissionRecord, AuditionServiceError> {
        let validated = self.validator.validate(form)?;
        let (applicant, video, proof) = validated.into_parts();

        let id = SubmissionId::generate();
        let video_blob = self.store_upload(&id, UploadRole::AuditionVideo, &video).await?;
        let proof_blob = self.store_upload(&id, UploadRole::PaymentProof, &proof).await?;

        let record = SubmissionRecord::create(
            id,
            applicant,
            video_blob.url,
            proof_blob.url,
            Utc::now(),
        );
        let stored = self.repository.insert(record).await?;

        info!(
            submission_id = %stored.id,
            region = stored.applicant.region.label(),
            "audition submission accepted"
        );

        self.send_confirmation(&stored).await;
        Ok(stored)
    }

    /// Move a submission to any status, optionally replacing its notes.
    pub async fn update_status(
        &self,
        id: &SubmissionId,
        patch: ReviewPatch,
    ) -> Result<SubmissionRecord, AuditionServiceError> {
        let updated = self.repository.apply_review(id, &patch, Utc::now()).await?;

        info!(
            submission_id = %updated.id,
            status = updated.status.label(),
            notes_replaced = patch.notes().is_some(),
            "submission status updated"
        );

        Ok(updated)
    }

    pub async fn get(&self, id: &SubmissionId) -> Result<SubmissionRecord, AuditionServiceError> {
        let record = self
            .repository
            .fetch(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub async fn review_queue(
        &self,
        filter: &ReviewFilter,
    ) -> Result<ReviewQueue, AuditionServiceError> {
        let records = self.repository.list_recent().await?;
        let stats = SubmissionStats::from_records(&records);
        let submissions = filter.apply(&records).into_iter().cloned().collect();
        Ok(ReviewQueue { submissions, stats })
    }
}

impl<R, B, N> AuditionService<R, B, N>
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    async fn store_upload(
        &self,
        id: &SubmissionId,
        role: UploadRole,
        file: &UploadedFile,
    ) -> Result<StoredBlob, BlobError> {
        let path = BlobPath::for_upload(id, role, file.extension());
        self.blobs.write(&path, &file.bytes, &file.content_type).await
    }

    async fn send_confirmation(&self, record: &SubmissionRecord) {
        let notice = ConfirmationNotice {
            to: record.applicant.email.clone(),
            display_name: record.applicant.display_name(),
            submission_id: record.id.clone(),
        };

        if let Err(err) = self.notifier.send(&notice).await {
            warn!(
                submission_id = %record.id,
                error = %err,
                "confirmation email failed; submission kept"
            );
        }
    }
}

/// Error raised by the audition service.
#[derive(Debug, thiserror::Error)]
pub enum AuditionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
