use super::common::*;

use crate::workflows::auditions::domain::{Region, UploadRole, UploadedFile};
use crate::workflows::auditions::validation::{
    IntakeField, IntakePolicy, IntakeValidator, ValidationError,
};

fn validate(form: crate::workflows::auditions::IntakeForm) -> Result<(), ValidationError> {
    IntakeValidator::default().validate(form).map(|_| ())
}

#[test]
fn accepts_complete_form() {
    let validated = IntakeValidator::default()
        .validate(valid_form())
        .expect("complete form is valid");

    assert_eq!(validated.applicant().region, Region::Region51);
    assert_eq!(validated.applicant().first_name, "Ada");
    assert_eq!(validated.audition_video().content_type, "video/mp4");
    assert_eq!(validated.payment_proof().file_name, "receipt.pdf");
}

#[test]
fn rejects_missing_and_blank_text_fields() {
    let mut form = valid_form();
    form.first_name = None;
    assert_eq!(
        validate(form),
        Err(ValidationError::MissingField(IntakeField::FirstName))
    );

    let mut form = valid_form();
    form.parish_pastor_name = Some("   ".to_string());
    let err = validate(form).expect_err("blank pastor rejected");
    assert_eq!(err, ValidationError::MissingField(IntakeField::ParishPastorName));
    assert_eq!(err.to_string(), "Parish pastor name is required");

    let mut form = valid_form();
    form.description = Some(String::new());
    assert_eq!(
        validate(form),
        Err(ValidationError::MissingField(IntakeField::Description))
    );
}

#[test]
fn first_missing_field_wins() {
    let mut form = valid_form();
    form.email = None;
    form.province = None;
    assert_eq!(
        validate(form),
        Err(ValidationError::MissingField(IntakeField::Email))
    );
}

#[test]
fn rejects_malformed_email() {
    for bad in ["foo@bar", "foo bar@example.org", "@example.org", "foo@@example.org"] {
        let mut form = valid_form();
        form.email = Some(bad.to_string());
        assert_eq!(validate(form), Err(ValidationError::InvalidEmail), "{bad}");
    }
}

#[test]
fn rejects_regions_outside_vocabulary() {
    let mut form = valid_form();
    form.region = Some("Region 99".to_string());
    let err = validate(form).expect_err("unknown region rejected");
    assert_eq!(err, ValidationError::UnknownRegion("Region 99".to_string()));
    assert_eq!(err.to_string(), "Region must be one of: Region 20, Region 51");

    let mut form = valid_form();
    form.region = Some("region 20".to_string());
    assert!(matches!(validate(form), Err(ValidationError::UnknownRegion(_))));
}

#[test]
fn description_boundary_is_fifty_characters() {
    let mut form = valid_form();
    form.description = Some(description(49));
    let err = validate(form).expect_err("49 characters rejected");
    assert_eq!(
        err,
        ValidationError::DescriptionTooShort {
            minimum: 50,
            found: 49
        }
    );
    assert_eq!(err.to_string(), "Description must be at least 50 characters");

    let mut form = valid_form();
    form.description = Some(description(50));
    assert_eq!(validate(form), Ok(()));
}

#[test]
fn description_counts_characters_not_bytes() {
    let mut form = valid_form();
    form.description = Some("é".repeat(50));
    assert_eq!(validate(form), Ok(()));
}

#[test]
fn rejects_missing_or_mistyped_video() {
    let mut form = valid_form();
    form.audition_video = None;
    assert_eq!(validate(form), Err(ValidationError::MissingVideo));

    let mut form = valid_form();
    form.audition_video = Some(UploadedFile::new("clip.png", "image/png", vec![1]));
    let err = validate(form).expect_err("png video rejected");
    assert_eq!(err.to_string(), "Audition video must be MP4, MOV, or AVI format");
}

#[test]
fn accepts_every_listed_video_type() {
    for content_type in ["video/mp4", "video/quicktime", "video/x-msvideo", "video/avi"] {
        let mut form = valid_form();
        form.audition_video = Some(UploadedFile::new("clip", content_type, vec![1]));
        assert_eq!(validate(form), Ok(()), "{content_type}");
    }
}

#[test]
fn ignores_content_type_parameters() {
    let mut form = valid_form();
    form.audition_video = Some(UploadedFile::new(
        "clip.mp4",
        "video/mp4; codecs=avc1",
        vec![1],
    ));
    assert_eq!(validate(form), Ok(()));
}

#[test]
fn rejects_missing_or_mistyped_proof() {
    let mut form = valid_form();
    form.payment_proof = None;
    assert_eq!(validate(form), Err(ValidationError::MissingPaymentProof));

    let mut form = valid_form();
    form.payment_proof = Some(UploadedFile::new("receipt.mp4", "video/mp4", vec![1]));
    let err = validate(form).expect_err("video proof rejected");
    assert_eq!(err.to_string(), "Payment proof must be JPG, PNG, or PDF format");

    for content_type in ["image/jpeg", "image/jpg", "image/png", "application/pdf"] {
        let mut form = valid_form();
        form.payment_proof = Some(UploadedFile::new("receipt", content_type, vec![1]));
        assert_eq!(validate(form), Ok(()), "{content_type}");
    }
}

#[test]
fn enforces_configured_upload_limits() {
    let validator = IntakeValidator::with_policy(IntakePolicy::with_upload_limits(32, 4));

    let mut form = valid_form();
    form.payment_proof = Some(UploadedFile::new("r.png", "image/png", vec![0; 4]));
    let err = validator.validate(form).expect_err("64 byte video too large");
    assert_eq!(
        err,
        ValidationError::FileTooLarge {
            role: UploadRole::AuditionVideo,
            limit_bytes: 32,
            found_bytes: 64
        }
    );

    let mut form = valid_form();
    form.audition_video = Some(UploadedFile::new("v.mp4", "video/mp4", vec![0; 32]));
    let err = validator.validate(form).expect_err("proof too large");
    assert!(matches!(
        err,
        ValidationError::FileTooLarge {
            role: UploadRole::PaymentProof,
            ..
        }
    ));
}

#[test]
fn type_checks_run_before_size_checks() {
    let validator = IntakeValidator::with_policy(IntakePolicy::with_upload_limits(1, 1));
    let mut form = valid_form();
    form.payment_proof = Some(UploadedFile::new("r.txt", "text/plain", vec![0; 8]));
    assert!(matches!(
        validator.validate(form),
        Err(ValidationError::UnsupportedProofType(_))
    ));
}

#[test]
fn size_message_reports_megabytes() {
    let err = ValidationError::FileTooLarge {
        role: UploadRole::PaymentProof,
        limit_bytes: 10 * 1024 * 1024,
        found_bytes: 11 * 1024 * 1024,
    };
    assert_eq!(err.to_string(), "Payment proof must be 10 MB or smaller");
}
