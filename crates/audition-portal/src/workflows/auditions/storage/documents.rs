use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::super::domain::{ReviewPatch, SubmissionId, SubmissionRecord};
use super::super::repository::{RepositoryError, SubmissionRepository};

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SubmissionDocument {
    version: u32,
    submissions: Vec<SubmissionRecord>,
}

/// Submission store backed by a single JSON document on disk.
///
/// Every write rewrites the whole document through a temporary file and a rename, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileSubmissionRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSubmissionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(unavailable(&self.path, err)),
        };

        let document: SubmissionDocument = serde_json::from_slice(&bytes)
            .map_err(|err| unavailable(&self.path, err))?;
        Ok(document.submissions)
    }

    async fn persist(&self, submissions: Vec<SubmissionRecord>) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| unavailable(parent, err))?;
        }

        let document = SubmissionDocument {
            version: DOCUMENT_VERSION,
            submissions,
        };
        let bytes = serde_json::to_vec_pretty(&document).map_err(|err| unavailable(&self.path, err))?;

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|err| unavailable(&staging, err))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| unavailable(&self.path, err))
    }
}

#[async_trait]
impl SubmissionRepository for JsonFileSubmissionRepository {
    async fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.load().await?;
        if submissions.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        submissions.push(record.clone());
        self.persist(submissions).await?;
        Ok(record)
    }

    async fn list_recent(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.load().await?;
        // Equal timestamps keep later inserts first.
        submissions.reverse();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let submissions = self.load().await?;
        Ok(submissions.into_iter().find(|record| &record.id == id))
    }

    async fn apply_review(
        &self,
        id: &SubmissionId,
        patch: &ReviewPatch,
        at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.load().await?;
        let record = submissions
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.apply_review(patch, at);
        let updated = record.clone();
        self.persist(submissions).await?;
        Ok(updated)
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}
