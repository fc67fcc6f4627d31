use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Competition regions offered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Region 20")]
    Region20,
    #[serde(rename = "Region 51")]
    Region51,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Region20, Region::Region51];

    pub const fn label(self) -> &'static str {
        match self {
            Region::Region20 => "Region 20",
            Region::Region51 => "Region 51",
        }
    }

    /// Exact, case-sensitive match against the form vocabulary.
    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.label() == raw)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Review status of a submission. Reviewers may move a submission between any two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Reviewed,
    Selected,
    Rejected,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Reviewed,
        SubmissionStatus::Selected,
        SubmissionStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Reviewed => "reviewed",
            SubmissionStatus::Selected => "selected",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Raised when a status string falls outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'; expected one of: pending, reviewed, selected, rejected")]
pub struct UnknownStatus(pub String);

/// Applicant-provided details. Written once at intake and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub region: Region,
    pub province: String,
    pub parish_name: String,
    pub parish_pastor_name: String,
    pub description: String,
}

impl ApplicantDetails {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Stored submission: applicant details, blob references, and review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub applicant: ApplicantDetails,
    pub audition_video_url: String,
    pub payment_proof_url: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    /// Build a freshly accepted submission in the `pending` state.
    pub fn create(
        id: SubmissionId,
        applicant: ApplicantDetails,
        audition_video_url: String,
        payment_proof_url: String,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            applicant,
            audition_video_url,
            payment_proof_url,
            submitted_at,
            status: SubmissionStatus::Pending,
            notes: String::new(),
            updated_at: None,
        }
    }

    /// The only mutation a stored record accepts. Applicant fields are untouched.
    pub fn apply_review(&mut self, patch: &ReviewPatch, at: DateTime<Utc>) {
        self.status = patch.status;
        if let Some(notes) = patch.notes() {
            self.notes = notes.to_string();
        }
        self.updated_at = Some(at);
    }
}

/// Reviewer update: a new status plus optional replacement notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPatch {
    pub status: SubmissionStatus,
    notes: Option<String>,
}

impl ReviewPatch {
    /// Empty notes are dropped so they never overwrite what a reviewer wrote before.
    pub fn new(status: SubmissionStatus, notes: Option<String>) -> Self {
        Self {
            status,
            notes: notes.filter(|value| !value.is_empty()),
        }
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Which of the two uploads a file plays in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadRole {
    AuditionVideo,
    PaymentProof,
}

impl UploadRole {
    pub const fn label(self) -> &'static str {
        match self {
            UploadRole::AuditionVideo => "Audition video",
            UploadRole::PaymentProof => "Payment proof",
        }
    }

    pub const fn file_stem(self) -> &'static str {
        match self {
            UploadRole::AuditionVideo => "video",
            UploadRole::PaymentProof => "payment",
        }
    }
}

impl fmt::Display for UploadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// File received on the intake form, with the content type the client declared.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension of the original file name, or `bin` when it has none usable.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
                ext
            }
            _ => "bin",
        }
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw intake form as received, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub parish_name: Option<String>,
    pub parish_pastor_name: Option<String>,
    pub description: Option<String>,
    pub audition_video: Option<UploadedFile>,
    pub payment_proof: Option<UploadedFile>,
}

/// Intake that passed every validation rule. Only the validator constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIntake {
    applicant: ApplicantDetails,
    audition_video: UploadedFile,
    payment_proof: UploadedFile,
}

impl ValidatedIntake {
    pub(crate) fn new(
        applicant: ApplicantDetails,
        audition_video: UploadedFile,
        payment_proof: UploadedFile,
    ) -> Self {
        Self {
            applicant,
            audition_video,
            payment_proof,
        }
    }

    pub fn applicant(&self) -> &ApplicantDetails {
        &self.applicant
    }

    pub fn audition_video(&self) -> &UploadedFile {
        &self.audition_video
    }

    pub fn payment_proof(&self) -> &UploadedFile {
        &self.payment_proof
    }

    pub fn into_parts(self) -> (ApplicantDetails, UploadedFile, UploadedFile) {
        (self.applicant, self.audition_video, self.payment_proof)
    }
}

/// Relative location of a stored blob, e.g. `auditions/<id>/video.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    pub fn for_upload(id: &SubmissionId, role: UploadRole, extension: &str) -> Self {
        Self(format!("auditions/{}/{}.{}", id, role.file_stem(), extension))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
