use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "completed" => Ok(EventStatus::Completed),
            other => Err(AppError::InternalWithMsg(format!("Unknown event status '{}'", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Cohost {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Invitee {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub invited_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Attendee {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub attended: bool,
}

/// Descriptive fields of an event: everything `editEvent` replaces.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventDetails {
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
}

impl EventDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("Location is required".into()));
        }
        for (label, value) in [("start_time", &self.start_time), ("end_time", &self.end_time)] {
            NaiveTime::parse_from_str(value, "%H:%M")
                .map_err(|_| AppError::Validation(format!("Invalid {} (HH:MM)", label)))?;
        }
        if self.capacity < 1 {
            return Err(AppError::Validation("Capacity must be a positive number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    #[serde(flatten)]
    pub details: EventDetails,
    pub creator_id: String,
    pub creator_email: String,
    pub status: EventStatus,
    pub cohosts: Vec<Cohost>,
    pub invited: Vec<Invitee>,
    pub attendees: Vec<Attendee>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(details: EventDetails, creator_id: String, creator_email: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            details,
            creator_id,
            creator_email,
            status: EventStatus::Upcoming,
            cohosts: Vec::new(),
            invited: Vec::new(),
            attendees: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_attendee(&self, user_id: &str) -> bool {
        self.attendees.iter().any(|a| a.user_id == user_id)
    }

    pub fn is_invited(&self, user_id: &str) -> bool {
        self.invited.iter().any(|i| i.user_id == user_id)
    }

    pub fn is_cohost(&self, user_id: &str) -> bool {
        self.cohosts.iter().any(|c| c.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.attendees.len() as i64 >= self.details.capacity as i64
    }

    /// Negative when invitations were accepted past capacity.
    pub fn remaining_slots(&self) -> i64 {
        self.details.capacity as i64 - self.attendees.len() as i64
    }
}

/// Raw `events` row. Only ever turned into an [`Event`] through
/// [`EventRow::into_event`], which is where the stored shape is checked.
#[derive(Debug, FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub description: String,
    pub image_url: String,
    pub capacity: i32,
    pub creator_id: String,
    pub creator_email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl EventRow {
    pub fn into_event(
        self,
        cohosts: Vec<Cohost>,
        invited: Vec<Invitee>,
        attendees: Vec<Attendee>,
    ) -> Result<Event, AppError> {
        let status: EventStatus = self.status.parse()?;
        if self.capacity < 1 {
            return Err(AppError::InternalWithMsg(format!(
                "Event {} has invalid capacity {}", self.id, self.capacity
            )));
        }

        Ok(Event {
            id: self.id,
            details: EventDetails {
                title: self.title,
                date: self.date,
                start_time: self.start_time,
                end_time: self.end_time,
                location: self.location,
                description: self.description,
                image_url: self.image_url,
                capacity: self.capacity,
            },
            creator_id: self.creator_id,
            creator_email: self.creator_email,
            status,
            cohosts,
            invited,
            attendees,
            created_at: self.created_at,
        })
    }
}

/// Membership row joined with its event id, used when loading whole collections.
#[derive(Debug, FromRow)]
pub struct CohostRow {
    pub event_id: String,
    #[sqlx(flatten)]
    pub cohost: Cohost,
}

#[derive(Debug, FromRow)]
pub struct InviteeRow {
    pub event_id: String,
    #[sqlx(flatten)]
    pub invitee: Invitee,
}

#[derive(Debug, FromRow)]
pub struct AttendeeRow {
    pub event_id: String,
    #[sqlx(flatten)]
    pub attendee: Attendee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    Full,
}
