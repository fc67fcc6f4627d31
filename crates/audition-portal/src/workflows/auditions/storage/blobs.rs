use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::super::domain::BlobPath;
use super::super::repository::{BlobError, BlobStore, StoredBlob};

/// Blob store writing uploads under a local directory.
///
/// Stored files are addressed as `{public_base_url}/uploads/{relative path}`; the HTTP
/// service serves that prefix straight from `root`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, relative)
    }

    /// Map a relative blob path onto disk, refusing anything that could escape `root`.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidPath(relative.to_string());

        if relative.is_empty() || relative.contains('\\') {
            return Err(invalid());
        }

        let candidate = Path::new(relative);
        let mut resolved = self.root.clone();
        for component in candidate.components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                _ => return Err(invalid()),
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(
        &self,
        path: &BlobPath,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, BlobError> {
        let target = self.resolve(path.as_str())?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| BlobError::Unavailable(format!("{}: {err}", parent.display())))?;
        }

        tokio::fs::write(&target, bytes)
            .await
            .map_err(|err| BlobError::Unavailable(format!("{}: {err}", target.display())))?;

        debug!(path = %path, content_type, size = bytes.len(), "blob written");

        Ok(StoredBlob {
            path: path.as_str().to_string(),
            url: self.url_for(path.as_str()),
        })
    }
}
