use std::io::Write;

use serde::Serialize;

use super::domain::SubmissionRecord;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    submitted_at: String,
    status: &'static str,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone_number: &'a str,
    region: &'static str,
    province: &'a str,
    parish_name: &'a str,
    parish_pastor_name: &'a str,
    description: &'a str,
    audition_video_url: &'a str,
    payment_proof_url: &'a str,
    notes: &'a str,
    updated_at: Option<String>,
}

impl<'a> From<&'a SubmissionRecord> for ExportRow<'a> {
    fn from(record: &'a SubmissionRecord) -> Self {
        let applicant = &record.applicant;
        Self {
            id: record.id.as_str(),
            submitted_at: record.submitted_at.to_rfc3339(),
            status: record.status.label(),
            first_name: &applicant.first_name,
            last_name: &applicant.last_name,
            email: &applicant.email,
            phone_number: &applicant.phone_number,
            region: applicant.region.label(),
            province: &applicant.province,
            parish_name: &applicant.parish_name,
            parish_pastor_name: &applicant.parish_pastor_name,
            description: &applicant.description,
            audition_video_url: &record.audition_video_url,
            payment_proof_url: &record.payment_proof_url,
            notes: &record.notes,
            updated_at: record.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Write one CSV row per submission, preserving the given order.
pub fn write_submissions_csv<'a, W, I>(writer: W, records: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a SubmissionRecord>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(ExportRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}
