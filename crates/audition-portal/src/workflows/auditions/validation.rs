use std::sync::LazyLock;

use mime::Mime;
use regex::Regex;

use super::domain::{
    ApplicantDetails, IntakeForm, Region, UploadRole, UploadedFile, ValidatedIntake,
};

const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 50;
const DEFAULT_MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;
const DEFAULT_MAX_PROOF_BYTES: u64 = 10 * 1024 * 1024;

const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/x-msvideo", "video/avi"];
const PROOF_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "application/pdf"];

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Text fields on the intake form, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Region,
    Province,
    ParishName,
    ParishPastorName,
    Description,
}

impl IntakeField {
    pub const fn label(self) -> &'static str {
        match self {
            IntakeField::FirstName => "First name",
            IntakeField::LastName => "Last name",
            IntakeField::Email => "Email",
            IntakeField::PhoneNumber => "Phone number",
            IntakeField::Region => "Region",
            IntakeField::Province => "Province",
            IntakeField::ParishName => "Parish name",
            IntakeField::ParishPastorName => "Parish pastor name",
            IntakeField::Description => "Description",
        }
    }
}

/// Reasons an intake submission is turned away. Messages are shown to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    MissingField(IntakeField),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Region must be one of: Region 20, Region 51")]
    UnknownRegion(String),
    #[error("Description must be at least {minimum} characters")]
    DescriptionTooShort { minimum: usize, found: usize },
    #[error("Audition video is required")]
    MissingVideo,
    #[error("Audition video must be MP4, MOV, or AVI format")]
    UnsupportedVideoType(String),
    #[error("Payment proof is required")]
    MissingPaymentProof,
    #[error("Payment proof must be JPG, PNG, or PDF format")]
    UnsupportedProofType(String),
    #[error("{role} must be {} MB or smaller", .limit_bytes / (1024 * 1024))]
    FileTooLarge {
        role: UploadRole,
        limit_bytes: u64,
        found_bytes: u64,
    },
}

/// Tunable limits applied during intake validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    pub min_description_chars: usize,
    pub max_video_bytes: u64,
    pub max_proof_bytes: u64,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            min_description_chars: DEFAULT_MIN_DESCRIPTION_CHARS,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            max_proof_bytes: DEFAULT_MAX_PROOF_BYTES,
        }
    }
}

impl IntakePolicy {
    pub fn with_upload_limits(max_video_bytes: u64, max_proof_bytes: u64) -> Self {
        Self {
            max_video_bytes,
            max_proof_bytes,
            ..Self::default()
        }
    }

    /// Largest request body an intake can legitimately need, with headroom for the text fields.
    pub fn max_request_bytes(&self) -> u64 {
        self.max_video_bytes
            .saturating_add(self.max_proof_bytes)
            .saturating_add(1024 * 1024)
    }
}

/// Pure validator producing `ValidatedIntake` instances. The first failing rule wins.
#[derive(Debug, Clone, Default)]
pub struct IntakeValidator {
    policy: IntakePolicy,
}

impl IntakeValidator {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    pub fn validate(&self, form: IntakeForm) -> Result<ValidatedIntake, ValidationError> {
        let IntakeForm {
            first_name,
            last_name,
            email,
            phone_number,
            region,
            province,
            parish_name,
            parish_pastor_name,
            description,
            audition_video,
            payment_proof,
        } = form;

        let first_name = required(first_name, IntakeField::FirstName)?;
        let last_name = required(last_name, IntakeField::LastName)?;
        let email = required(email, IntakeField::Email)?;
        let phone_number = required(phone_number, IntakeField::PhoneNumber)?;
        let region = required(region, IntakeField::Region)?;
        let province = required(province, IntakeField::Province)?;
        let parish_name = required(parish_name, IntakeField::ParishName)?;
        let parish_pastor_name = required(parish_pastor_name, IntakeField::ParishPastorName)?;
        let description = required(description, IntakeField::Description)?;

        if !EMAIL_SHAPE.is_match(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        let region = Region::from_label(&region).ok_or(ValidationError::UnknownRegion(region))?;

        let description_chars = description.chars().count();
        if description_chars < self.policy.min_description_chars {
            return Err(ValidationError::DescriptionTooShort {
                minimum: self.policy.min_description_chars,
                found: description_chars,
            });
        }

        let audition_video = audition_video.ok_or(ValidationError::MissingVideo)?;
        if !declares_one_of(&audition_video, VIDEO_CONTENT_TYPES) {
            return Err(ValidationError::UnsupportedVideoType(
                audition_video.content_type.clone(),
            ));
        }

        let payment_proof = payment_proof.ok_or(ValidationError::MissingPaymentProof)?;
        if !declares_one_of(&payment_proof, PROOF_CONTENT_TYPES) {
            return Err(ValidationError::UnsupportedProofType(
                payment_proof.content_type.clone(),
            ));
        }

        within_limit(&audition_video, UploadRole::AuditionVideo, self.policy.max_video_bytes)?;
        within_limit(&payment_proof, UploadRole::PaymentProof, self.policy.max_proof_bytes)?;

        let applicant = ApplicantDetails {
            first_name,
            last_name,
            email,
            phone_number,
            region,
            province,
            parish_name,
            parish_pastor_name,
            description,
        };

        Ok(ValidatedIntake::new(applicant, audition_video, payment_proof))
    }
}

fn required(value: Option<String>, field: IntakeField) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn declares_one_of(file: &UploadedFile, accepted: &[&str]) -> bool {
    match file.content_type.trim().parse::<Mime>() {
        Ok(parsed) => {
            let essence = parsed.essence_str().to_ascii_lowercase();
            accepted.contains(&essence.as_str())
        }
        Err(_) => false,
    }
}

fn within_limit(file: &UploadedFile, role: UploadRole, limit: u64) -> Result<(), ValidationError> {
    if file.len() > limit {
        return Err(ValidationError::FileTooLarge {
            role,
            limit_bytes: limit,
            found_bytes: file.len(),
        });
    }
    Ok(())
}
