use async_trait::async_trait;
use reqwest::Client;
use tracing::error;
use crate::domain::ports::BlobStore;
use crate::error::AppError;

/// Object store reached over HTTP: `PUT {base}/{key}` with a bearer token,
/// objects readable at the same URL.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, content_type: &str, data: &[u8]) -> Result<(), AppError> {
        let mut req = self.client.put(self.object_url(key))
            .header("Content-Type", content_type)
            .body(data.to_vec());

        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let res = req.send().await.map_err(|e| {
            let msg = format!("Blob store connection error: {}", e);
            error!("{}", msg);
            AppError::Storage(msg)
        })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Blob store rejected upload. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Storage(msg));
        }

        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, AppError> {
        Ok(self.object_url(key))
    }
}
