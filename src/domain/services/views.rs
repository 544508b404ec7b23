//! Read-side projections over the event collection.
//!
//! The selection logic is plain functions over a date-ordered slice so it can
//! be tested without a database; `ViewService` loads the collection and
//! decorates the result with creator display names.

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::domain::models::{
    event::{Event, EventStatus},
    session::Session,
};
use crate::domain::ports::EventRepository;
use crate::domain::services::{directory::Directory, membership::Role};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    #[default]
    All,
    Created,
    Cohosted,
    Joined,
    Completed,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub created: usize,
    pub attending: usize,
    pub invited: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub creator_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub upcoming: Option<EventSummary>,
    pub invitations: Vec<EventSummary>,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ViewerRole {
    #[serde(flatten)]
    pub role: Role,
    pub is_attendee: bool,
    pub is_invited: bool,
}

#[derive(Debug, Serialize)]
pub struct EventDetailView {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub remaining_slots: i64,
    pub viewer: Option<ViewerRole>,
}

/// Events the user neither created nor joined.
pub fn discover<'a>(user_id: &str, events: &'a [Event]) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|e| e.creator_id != user_id && !e.is_attendee(user_id))
        .collect()
}

/// Soonest not-yet-completed event the user created or joined.
pub fn upcoming<'a>(user_id: &str, events: &'a [Event]) -> Option<&'a Event> {
    events
        .iter()
        .filter(|e| e.status != EventStatus::Completed)
        .filter(|e| e.creator_id == user_id || e.is_attendee(user_id))
        .min_by_key(|e| (e.details.date, e.created_at))
}

pub fn invitations<'a>(user_id: &str, events: &'a [Event]) -> Vec<&'a Event> {
    events.iter().filter(|e| e.is_invited(user_id)).collect()
}

pub fn dashboard_stats(user_id: &str, events: &[Event]) -> DashboardStats {
    events.iter().fold(DashboardStats::default(), |mut stats, e| {
        if e.creator_id == user_id {
            stats.created += 1;
        }
        if e.is_attendee(user_id) {
            stats.attending += 1;
        }
        if e.is_invited(user_id) {
            stats.invited += 1;
        }
        stats
    })
}

pub fn your_events<'a>(user_id: &str, events: &'a [Event], filter: EventFilter) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|e| {
            let role = Role::resolve(user_id, e);
            let attending = e.is_attendee(user_id);
            if !(role.can_manage() || attending) {
                return false;
            }
            match filter {
                EventFilter::All => true,
                EventFilter::Created => role.can_manage(),
                EventFilter::Cohosted => role.is_cohost && !role.is_creator,
                EventFilter::Joined => {
                    attending && !role.can_manage() && e.status != EventStatus::Completed
                }
                EventFilter::Completed => e.status == EventStatus::Completed,
            }
        })
        .collect()
}

pub struct ViewService {
    events: Arc<dyn EventRepository>,
    directory: Arc<Directory>,
}

impl ViewService {
    pub fn new(events: Arc<dyn EventRepository>, directory: Arc<Directory>) -> Self {
        Self { events, directory }
    }

    /// Attaches creator names, looking each creator up once per call.
    async fn summarize(&self, selected: Vec<&Event>) -> Vec<EventSummary> {
        let mut names: HashMap<String, Option<String>> = HashMap::new();
        let mut out = Vec::with_capacity(selected.len());

        for event in selected {
            let name = match names.get(&event.creator_id) {
                Some(cached) => cached.clone(),
                None => {
                    let name = self.directory
                        .display_name(&event.creator_id, Some(&event.creator_email))
                        .await;
                    names.insert(event.creator_id.clone(), name.clone());
                    name
                }
            };
            out.push(EventSummary { event: event.clone(), creator_name: name });
        }
        out
    }

    pub async fn discover(&self, session: &Session) -> Result<Vec<EventSummary>, AppError> {
        let events = self.events.list().await?;
        Ok(self.summarize(discover(&session.user_id, &events)).await)
    }

    pub async fn dashboard(&self, session: &Session) -> Result<Dashboard, AppError> {
        let events = self.events.list().await?;
        let user_id = &session.user_id;

        let upcoming = self.summarize(upcoming(user_id, &events).into_iter().collect()).await;
        let invitations = self.summarize(invitations(user_id, &events)).await;

        Ok(Dashboard {
            upcoming: upcoming.into_iter().next(),
            invitations,
            stats: dashboard_stats(user_id, &events),
        })
    }

    pub async fn your_events(&self, session: &Session, filter: EventFilter) -> Result<Vec<EventSummary>, AppError> {
        let events = self.events.list().await?;
        Ok(self.summarize(your_events(&session.user_id, &events, filter)).await)
    }

    pub async fn detail(&self, session: Option<&Session>, event_id: &str) -> Result<EventDetailView, AppError> {
        let event = self.events.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let viewer = session.map(|s| ViewerRole {
            role: Role::resolve(&s.user_id, &event),
            is_attendee: event.is_attendee(&s.user_id),
            is_invited: event.is_invited(&s.user_id),
        });
        let remaining_slots = event.remaining_slots();
        let summary = self.summarize(vec![&event]).await.into_iter().next()
            .ok_or(AppError::Internal)?;

        Ok(EventDetailView { summary, remaining_slots, viewer })
    }
}
