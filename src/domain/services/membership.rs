//! Membership and role rules for events.
//!
//! Every operation loads the event, checks the caller's role and the
//! operation's precondition, then applies one conditional repository update
//! and returns the freshly re-read event. The precondition check gives the
//! caller a precise error; the conditional update is what actually guards
//! the invariant when two requests race.

use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::domain::models::{
    event::{Attendee, Cohost, Event, EventDetails, EventStatus, Invitee, JoinOutcome},
    session::Session,
    user::User,
};
use crate::domain::ports::{EventRepository, UserRepository};
use crate::domain::services::images::{creation_key, edit_key, ImageService, ValidatedImage};
use crate::error::AppError;

/// The caller's relationship to an event. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Role {
    pub is_creator: bool,
    pub is_cohost: bool,
}

impl Role {
    pub fn resolve(user_id: &str, event: &Event) -> Self {
        Self {
            is_creator: event.creator_id == user_id,
            is_cohost: event.is_cohost(user_id),
        }
    }

    pub fn can_manage(&self) -> bool {
        self.is_creator || self.is_cohost
    }
}

pub fn can_manage(user_id: &str, event: &Event) -> bool {
    Role::resolve(user_id, event).can_manage()
}

fn require_manager(session: &Session, event: &Event) -> Result<Role, AppError> {
    let role = Role::resolve(&session.user_id, event);
    if !role.can_manage() {
        return Err(AppError::Forbidden("Only the host or a co-host can do this".into()));
    }
    Ok(role)
}

fn require_creator(session: &Session, event: &Event) -> Result<(), AppError> {
    if event.creator_id != session.user_id {
        return Err(AppError::Forbidden("Only the event creator can do this".into()));
    }
    Ok(())
}

fn require_confirmation(confirmed: bool, action: &str) -> Result<(), AppError> {
    if !confirmed {
        return Err(AppError::Validation(format!("Confirmation required to {}", action)));
    }
    Ok(())
}

pub struct MembershipService {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<ImageService>,
}

impl MembershipService {
    pub fn new(events: Arc<dyn EventRepository>, users: Arc<dyn UserRepository>, images: Arc<ImageService>) -> Self {
        Self { events, users, images }
    }

    async fn load(&self, event_id: &str) -> Result<Event, AppError> {
        self.events.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))
    }

    async fn load_user(&self, user_id: &str) -> Result<User, AppError> {
        self.users.find_by_id(user_id).await?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    /// Creates an event owned by the caller. A failed image upload is logged
    /// and the event is created without an image.
    pub async fn create_event(
        &self,
        session: &Session,
        mut details: EventDetails,
        image: Option<ValidatedImage>,
    ) -> Result<Event, AppError> {
        details.validate()?;

        if let Some(image) = image {
            let key = creation_key(&image.file_name);
            match self.images.upload(&key, &image).await {
                Ok(url) => details.image_url = url,
                Err(e) => {
                    warn!("Image upload failed, creating event without image: {}", e);
                    details.image_url = String::new();
                }
            }
        }

        let event = Event::new(details, session.user_id.clone(), session.email.clone());
        let created = self.events.create(&event).await?;
        info!("Event created: {} by {}", created.id, session.user_id);
        Ok(created)
    }

    /// Full replace of the descriptive fields. Unlike creation, a failed
    /// image upload fails the edit.
    pub async fn edit_event(
        &self,
        session: &Session,
        event_id: &str,
        mut details: EventDetails,
        image: Option<ValidatedImage>,
    ) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_manager(session, &event)?;
        details.validate()?;

        if let Some(image) = image {
            let key = edit_key(&event.id, &image.file_name);
            details.image_url = self.images.upload(&key, &image).await?;
        }

        self.events.update_details(&event.id, &details).await?;
        info!("Event updated: {}", event.id);
        self.load(&event.id).await
    }

    pub async fn join(&self, session: &Session, event_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;

        if event.is_full() {
            return Err(AppError::Conflict("This event is full".into()));
        }
        if event.is_attendee(&session.user_id) {
            return Err(AppError::Conflict("You already joined this event".into()));
        }

        let attendee = Attendee {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            username: session.member_name(),
            joined_at: Utc::now(),
            attended: false,
        };

        match self.events.add_attendee_within_capacity(&event.id, &attendee).await? {
            JoinOutcome::Joined => info!("User {} joined event {}", session.user_id, event.id),
            JoinOutcome::AlreadyJoined => {
                return Err(AppError::Conflict("You already joined this event".into()));
            }
            JoinOutcome::Full => {
                return Err(AppError::Conflict("This event is full".into()));
            }
        }

        self.load(&event.id).await
    }

    /// Leaving an event you are not attending is a no-op.
    pub async fn leave(&self, session: &Session, event_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;

        if self.events.remove_attendee(&event.id, &session.user_id).await? {
            info!("User {} left event {}", session.user_id, event.id);
        } else {
            debug!("User {} was not attending event {}", session.user_id, event.id);
        }

        self.load(&event.id).await
    }

    pub async fn invite_user(&self, session: &Session, event_id: &str, target_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_manager(session, &event)?;

        if event.is_invited(target_id) {
            return Err(AppError::Conflict("User already invited".into()));
        }
        let target = self.load_user(target_id).await?;

        let invitee = Invitee {
            user_id: target.id.clone(),
            email: target.email.clone(),
            username: target.display_name(),
            invited_at: Utc::now(),
        };

        if !self.events.add_invitee(&event.id, &invitee).await? {
            return Err(AppError::Conflict("User already invited".into()));
        }

        info!("User {} invited to event {} by {}", target.id, event.id, session.user_id);
        self.load(&event.id).await
    }

    /// Accepting skips the capacity ceiling that `join` enforces.
    pub async fn accept_invitation(&self, session: &Session, event_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;

        if !event.is_invited(&session.user_id) {
            return Err(AppError::NotFound("No pending invitation".into()));
        }

        let attendee = Attendee {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            username: session.member_name(),
            joined_at: Utc::now(),
            attended: false,
        };

        if !self.events.accept_invitation(&event.id, &attendee).await? {
            return Err(AppError::NotFound("No pending invitation".into()));
        }

        let updated = self.load(&event.id).await?;
        if updated.remaining_slots() < 0 {
            warn!(
                event_id = %updated.id,
                capacity = updated.details.capacity,
                attendees = updated.attendees.len(),
                "Accepted invitation pushed event over capacity"
            );
        }
        info!("User {} accepted invitation to event {}", session.user_id, updated.id);
        Ok(updated)
    }

    pub async fn invite_cohost(&self, session: &Session, event_id: &str, target_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_creator(session, &event)?;

        if target_id == event.creator_id {
            return Err(AppError::Validation("The creator cannot be a co-host".into()));
        }
        if event.is_cohost(target_id) {
            return Err(AppError::Conflict("User is already a co-host".into()));
        }
        let target = self.load_user(target_id).await?;

        let cohost = Cohost {
            user_id: target.id.clone(),
            email: target.email.clone(),
            username: target.display_name(),
            added_at: Utc::now(),
        };

        if !self.events.add_cohost(&event.id, &cohost).await? {
            return Err(AppError::Conflict("User is already a co-host".into()));
        }

        info!("User {} made co-host of event {}", target.id, event.id);
        self.load(&event.id).await
    }

    pub async fn remove_cohost(
        &self,
        session: &Session,
        event_id: &str,
        target_id: &str,
        confirmed: bool,
    ) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_creator(session, &event)?;
        require_confirmation(confirmed, "remove a co-host")?;

        if !self.events.remove_cohost(&event.id, target_id).await? {
            return Err(AppError::NotFound("User is not a co-host of this event".into()));
        }

        info!("Co-host {} removed from event {}", target_id, event.id);
        self.load(&event.id).await
    }

    pub async fn remove_attendee(&self, session: &Session, event_id: &str, target_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_manager(session, &event)?;

        if !self.events.remove_attendee(&event.id, target_id).await? {
            return Err(AppError::NotFound("Attendee not found".into()));
        }

        info!("Attendee {} removed from event {} by {}", target_id, event.id, session.user_id);
        self.load(&event.id).await
    }

    pub async fn toggle_attendance(&self, session: &Session, event_id: &str, target_id: &str) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_manager(session, &event)?;

        let attended = self.events.toggle_attendance(&event.id, target_id).await?
            .ok_or(AppError::NotFound("Attendee not found".into()))?;

        info!("Attendance for {} on event {} set to {}", target_id, event.id, attended);
        self.load(&event.id).await
    }

    pub async fn mark_completed(&self, session: &Session, event_id: &str, confirmed: bool) -> Result<Event, AppError> {
        let event = self.load(event_id).await?;
        require_manager(session, &event)?;
        require_confirmation(confirmed, "mark this event as completed")?;

        if event.status == EventStatus::Completed || !self.events.mark_completed(&event.id).await? {
            return Err(AppError::Conflict("Event is already completed".into()));
        }

        info!("Event {} marked completed by {}", event.id, session.user_id);
        self.load(&event.id).await
    }

    pub async fn delete_event(&self, session: &Session, event_id: &str, confirmed: bool) -> Result<(), AppError> {
        let event = self.load(event_id).await?;
        require_creator(session, &event)?;
        require_confirmation(confirmed, "delete this event")?;

        self.events.delete(&event.id).await?;
        info!("Event deleted: {}", event.id);
        Ok(())
    }
}
