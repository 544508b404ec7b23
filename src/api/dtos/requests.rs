use chrono::NaiveDate;
use serde::Deserialize;
use crate::domain::models::event::EventDetails;
use crate::domain::services::{directory::CandidateKind, images::ValidatedImage, views::EventFilter};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

/// Body of both create and edit. Edit is a full replace, so the client sends
/// the current `image_url` back unless it uploads a new image.
#[derive(Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub capacity: i32,
    pub image: Option<ImageUpload>,
}

impl EventRequest {
    pub fn into_parts(self) -> Result<(EventDetails, Option<ValidatedImage>), AppError> {
        let image = self.image
            .map(|img| ValidatedImage::decode(&img.file_name, &img.content_type, &img.data))
            .transpose()?;

        let details = EventDetails {
            title: self.title.trim().to_string(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location.trim().to_string(),
            description: self.description,
            image_url: self.image_url,
            capacity: self.capacity,
        };

        Ok((details, image))
    }
}

#[derive(Deserialize)]
pub struct TargetUserRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Deserialize)]
pub struct CandidatesQuery {
    pub kind: CandidateKind,
    #[serde(default)]
    pub search: String,
}

#[derive(Deserialize)]
pub struct MineQuery {
    #[serde(default)]
    pub filter: EventFilter,
}
