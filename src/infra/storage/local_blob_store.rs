use std::path::PathBuf;
use async_trait::async_trait;
use tracing::debug;
use crate::domain::ports::BlobStore;
use crate::error::AppError;

/// Writes blobs under a local directory that the router serves at `/files`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(AppError::Storage(format!("Refusing unsafe key '{}'", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, _content_type: &str, data: &[u8]) -> Result<(), AppError> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, AppError> {
        let path = self.path_for(key)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::Storage(format!("No blob stored under '{}'", key)));
        }
        Ok(format!("{}/files/{}", self.public_base_url, key))
    }
}
