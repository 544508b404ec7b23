use crate::domain::models::{
    user::User,
    event::{Attendee, Cohost, Event, EventDetails, Invitee, JoinOutcome},
    auth::RefreshTokenRecord,
};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn search_by_email(&self, fragment: &str) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}

/// Event persistence.
///
/// Every membership method is a single conditional update: it either applies
/// completely or reports that its condition did not hold. None of them
/// rewrites a whole membership list.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    /// Whole collection, date ascending.
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn update_details(&self, id: &str, details: &EventDetails) -> Result<(), AppError>;
    /// `false` when the event was already completed.
    async fn mark_completed(&self, id: &str) -> Result<bool, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Appends unless the user is present or the event is at capacity.
    async fn add_attendee_within_capacity(&self, event_id: &str, attendee: &Attendee) -> Result<JoinOutcome, AppError>;
    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<bool, AppError>;
    /// New `attended` value, `None` when the user is not an attendee.
    async fn toggle_attendance(&self, event_id: &str, user_id: &str) -> Result<Option<bool>, AppError>;

    async fn add_invitee(&self, event_id: &str, invitee: &Invitee) -> Result<bool, AppError>;
    /// Moves the invitation into the attendee list. No capacity ceiling.
    async fn accept_invitation(&self, event_id: &str, attendee: &Attendee) -> Result<bool, AppError>;

    async fn add_cohost(&self, event_id: &str, cohost: &Cohost) -> Result<bool, AppError>;
    async fn remove_cohost(&self, event_id: &str, user_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, data: &[u8]) -> Result<(), AppError>;
    async fn public_url(&self, key: &str) -> Result<String, AppError>;
}
