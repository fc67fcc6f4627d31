use std::str::FromStr;

use serde::Serialize;

use super::domain::{SubmissionRecord, SubmissionStatus, UnknownStatus};

/// Status selection on the review dashboard: every submission or a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SubmissionStatus),
}

impl StatusFilter {
    pub fn matches(self, status: SubmissionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "all" {
            return Ok(StatusFilter::All);
        }
        raw.parse().map(StatusFilter::Only)
    }
}

/// Reviewer-side selection: status predicate AND free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub status: StatusFilter,
    search: String,
}

impl ReviewFilter {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into().to_lowercase(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on first name, last name, email or region.
    pub fn matches_search(&self, record: &SubmissionRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let applicant = &record.applicant;
        [
            applicant.first_name.as_str(),
            applicant.last_name.as_str(),
            applicant.email.as_str(),
            applicant.region.label(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.search))
    }

    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        self.status.matches(record.status) && self.matches_search(record)
    }

    /// Keep matching records in their incoming order.
    pub fn apply<'a>(&self, records: &'a [SubmissionRecord]) -> Vec<&'a SubmissionRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Dashboard counters computed over the unfiltered submission list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionStats {
    pub total: usize,
    pub pending: usize,
    pub reviewed: usize,
    pub selected: usize,
    pub rejected: usize,
}

impl SubmissionStats {
    pub fn from_records(records: &[SubmissionRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    SubmissionStatus::Pending => stats.pending += 1,
                    SubmissionStatus::Reviewed => stats.reviewed += 1,
                    SubmissionStatus::Selected => stats.selected += 1,
                    SubmissionStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }
}
