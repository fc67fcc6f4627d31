//! Audition intake, storage, and review workflow.
//!
//! Submitters post the intake form with two uploads; the validator decides acceptance,
//! the service stores the uploads and the record, and reviewers behind the shared-secret
//! gate filter, search, and move submissions between statuses.

pub mod access;
pub mod domain;
pub mod export;
pub mod filter;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod tests;

pub use access::{AccessError, ReviewerGate, ReviewerSession};
pub use domain::{
    ApplicantDetails, BlobPath, IntakeForm, Region, ReviewPatch, SubmissionId, SubmissionRecord,
    SubmissionStatus, UnknownStatus, UploadRole, UploadedFile, ValidatedIntake,
};
pub use export::write_submissions_csv;
pub use filter::{ReviewFilter, StatusFilter, SubmissionStats};
pub use notify::{DisabledSender, ZeptoMailSender};
pub use repository::{
    BlobError, BlobStore, ConfirmationNotice, ConfirmationSender, NotificationError,
    RepositoryError, StoredBlob, SubmissionRepository,
};
pub use router::{audition_router, PortalState};
pub use service::{AuditionService, AuditionServiceError, ReviewQueue};
pub use storage::{JsonFileSubmissionRepository, LocalBlobStore};
pub use validation::{IntakeField, IntakePolicy, IntakeValidator, ValidationError};
