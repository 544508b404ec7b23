use std::sync::Arc;
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use crate::domain::ports::BlobStore;
use crate::error::AppError;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const KEY_PREFIX: &str = "eventImages";

/// Image bytes that passed client-side checks and may be uploaded.
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ValidatedImage {
    pub fn decode(file_name: &str, content_type: &str, data_base64: &str) -> Result<Self, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation("Please select a valid image file".into()));
        }

        let bytes = general_purpose::STANDARD
            .decode(data_base64.trim())
            .map_err(|_| AppError::Validation("Image data is not valid base64".into()))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation("File size must be less than 10MB".into()));
        }

        Ok(Self {
            file_name: sanitize_file_name(file_name),
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { "image".to_string() } else { cleaned }
}

/// Key for an image uploaded while creating an event.
pub fn creation_key(file_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}/{}_{}_{}", KEY_PREFIX, Utc::now().timestamp_millis(), suffix, file_name)
}

/// Key for a replacement image; re-uploading the same file name overwrites.
pub fn edit_key(event_id: &str, file_name: &str) -> String {
    format!("{}/{}_{}", KEY_PREFIX, event_id, file_name)
}

pub struct ImageService {
    store: Arc<dyn BlobStore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Upload, then resolve the retrieval URL.
    pub async fn upload(&self, key: &str, image: &ValidatedImage) -> Result<String, AppError> {
        self.store.put(key, &image.content_type, &image.bytes).await?;
        self.store.public_url(key).await
    }
}
