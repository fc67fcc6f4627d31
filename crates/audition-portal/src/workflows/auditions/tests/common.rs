use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::auditions::domain::{
    ApplicantDetails, BlobPath, IntakeForm, Region, ReviewPatch, SubmissionId, SubmissionRecord,
    SubmissionStatus, UploadedFile,
};
use crate::workflows::auditions::repository::{
    BlobError, BlobStore, ConfirmationNotice, ConfirmationSender, NotificationError,
    RepositoryError, StoredBlob, SubmissionRepository,
};
use crate::workflows::auditions::{AuditionService, IntakePolicy, ReviewerGate};

pub(super) const REVIEWER_SECRET: &str = "panel-secret";

pub(super) fn description(chars: usize) -> String {
    "a".repeat(chars)
}

pub(super) fn video() -> UploadedFile {
    UploadedFile::new("audition.mp4", "video/mp4", vec![0u8; 64])
}

pub(super) fn proof() -> UploadedFile {
    UploadedFile::new("receipt.pdf", "application/pdf", b"%PDF-1.4".to_vec())
}

pub(super) fn valid_form() -> IntakeForm {
    IntakeForm {
        first_name: Some("Ada".to_string()),
        last_name: Some("Okafor".to_string()),
        email: Some("ada@example.org".to_string()),
        phone_number: Some("+234 801 000 0000".to_string()),
        region: Some("Region 51".to_string()),
        province: Some("Lagos Province 3".to_string()),
        parish_name: Some("Grace Parish".to_string()),
        parish_pastor_name: Some("Pastor Bello".to_string()),
        description: Some(description(60)),
        audition_video: Some(video()),
        payment_proof: Some(proof()),
    }
}

pub(super) fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().expect("valid instant")
        + Duration::minutes(minutes)
}

pub(super) fn record(
    id: &str,
    first_name: &str,
    email: &str,
    region: Region,
    status: SubmissionStatus,
    submitted_minute: i64,
) -> SubmissionRecord {
    let applicant = ApplicantDetails {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: email.to_string(),
        phone_number: "0800".to_string(),
        region,
        province: "Province".to_string(),
        parish_name: "Parish".to_string(),
        parish_pastor_name: "Pastor".to_string(),
        description: description(50),
    };
    let mut record = SubmissionRecord::create(
        SubmissionId(id.to_string()),
        applicant,
        format!("https://cdn.test/auditions/{id}/video.mp4"),
        format!("https://cdn.test/auditions/{id}/payment.pdf"),
        at(submitted_minute),
    );
    record.status = status;
    record
}

pub(super) fn build_service() -> (
    AuditionService<MemoryRepository, MemoryBlobs, RecordingSender>,
    Arc<MemoryRepository>,
    Arc<MemoryBlobs>,
    Arc<RecordingSender>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let blobs = Arc::new(MemoryBlobs::default());
    let sender = Arc::new(RecordingSender::default());
    let service = AuditionService::new(
        repository.clone(),
        blobs.clone(),
        sender.clone(),
        IntakePolicy::default(),
    );
    (service, repository, blobs, sender)
}

pub(super) fn reviewer_gate() -> Arc<ReviewerGate> {
    Arc::new(ReviewerGate::new(REVIEWER_SECRET, Duration::minutes(30)))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(records: Vec<SubmissionRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[async_trait]
impl SubmissionRepository for MemoryRepository {
    async fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let mut records = self.records.lock().expect("repository mutex poisoned").clone();
        records.reverse();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records)
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    async fn apply_review(
        &self,
        id: &SubmissionId,
        patch: &ReviewPatch,
        at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.apply_review(patch, at);
        Ok(record.clone())
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl SubmissionRepository for UnavailableRepository {
    async fn insert(&self, _record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    async fn list_recent(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    async fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    async fn apply_review(
        &self,
        _id: &SubmissionId,
        _patch: &ReviewPatch,
        _at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct WrittenBlob {
    pub(super) path: String,
    pub(super) content_type: String,
    pub(super) len: usize,
}

#[derive(Default, Clone)]
pub(super) struct MemoryBlobs {
    written: Arc<Mutex<Vec<WrittenBlob>>>,
}

impl MemoryBlobs {
    pub(super) fn written(&self) -> Vec<WrittenBlob> {
        self.written.lock().expect("blob mutex poisoned").clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn write(
        &self,
        path: &BlobPath,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, BlobError> {
        self.written
            .lock()
            .expect("blob mutex poisoned")
            .push(WrittenBlob {
                path: path.as_str().to_string(),
                content_type: content_type.to_string(),
                len: bytes.len(),
            });
        Ok(StoredBlob {
            path: path.as_str().to_string(),
            url: format!("https://cdn.test/{path}"),
        })
    }
}

pub(super) struct FailingBlobs;

#[async_trait]
impl BlobStore for FailingBlobs {
    async fn write(
        &self,
        _path: &BlobPath,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredBlob, BlobError> {
        Err(BlobError::Unavailable("bucket unreachable".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingSender {
    sent: Arc<Mutex<Vec<ConfirmationNotice>>>,
}

impl RecordingSender {
    pub(super) fn sent(&self) -> Vec<ConfirmationNotice> {
        self.sent.lock().expect("sender mutex poisoned").clone()
    }
}

#[async_trait]
impl ConfirmationSender for RecordingSender {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("sender mutex poisoned")
            .push(notice.clone());
        Ok(())
    }
}

pub(super) struct FailingSender;

#[async_trait]
impl ConfirmationSender for FailingSender {
    async fn send(&self, _notice: &ConfirmationNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected {
            status: 503,
            body: "mail relay down".to_string(),
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
