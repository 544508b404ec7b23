use std::sync::Arc;
use serde::Deserialize;
use tracing::warn;
use crate::domain::models::{
    event::Event,
    session::Session,
    user::{email_local_part, UserSummary},
};
use crate::domain::ports::UserRepository;
use crate::error::AppError;

/// Which management list a candidate search feeds.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Attendee,
    Cohost,
}

/// User lookups that sit beside the membership rules: display names and
/// people search for the invite and co-host pickers.
pub struct Directory {
    users: Arc<dyn UserRepository>,
}

impl Directory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Best-effort display name. A missing profile falls back to the local
    /// part of `fallback_email`; a failed lookup is logged and yields `None`.
    pub async fn display_name(&self, user_id: &str, fallback_email: Option<&str>) -> Option<String> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(user.display_name()),
            Ok(None) => fallback_email.map(|email| email_local_part(email).to_string()),
            Err(e) => {
                warn!("Display name lookup failed for {}: {}", user_id, e);
                None
            }
        }
    }

    /// Users whose email contains `fragment`, excluding the caller.
    pub async fn search(&self, session: &Session, fragment: &str) -> Result<Vec<UserSummary>, AppError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.users.search_by_email(fragment).await?;
        Ok(users
            .iter()
            .filter(|u| u.id != session.user_id)
            .map(UserSummary::from)
            .collect())
    }

    /// Search results narrowed to people who can still be added to `event`
    /// in the given role.
    pub async fn candidates(
        &self,
        session: &Session,
        event: &Event,
        kind: CandidateKind,
        fragment: &str,
    ) -> Result<Vec<UserSummary>, AppError> {
        let found = self.search(session, fragment).await?;
        Ok(filter_candidates(found, event, kind))
    }
}

/// Drops users already holding the role in question, and the creator.
pub fn filter_candidates(users: Vec<UserSummary>, event: &Event, kind: CandidateKind) -> Vec<UserSummary> {
    users
        .into_iter()
        .filter(|u| u.id != event.creator_id)
        .filter(|u| match kind {
            CandidateKind::Attendee => !event.is_attendee(&u.id) && !event.is_invited(&u.id),
            CandidateKind::Cohost => !event.is_cohost(&u.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use crate::domain::models::event::{Attendee, Cohost, EventDetails, Invitee};

    fn summary(id: &str) -> UserSummary {
        UserSummary { id: id.into(), email: format!("{}@example.com", id), display_name: id.into() }
    }

    fn event() -> Event {
        let mut ev = Event::new(
            EventDetails {
                title: "Board games".into(),
                date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
                start_time: "19:00".into(),
                end_time: "23:00".into(),
                location: "Cafe".into(),
                description: String::new(),
                image_url: String::new(),
                capacity: 6,
            },
            "host".into(),
            "host@example.com".into(),
        );
        let now = Utc::now();
        ev.attendees.push(Attendee {
            user_id: "att".into(), email: "att@example.com".into(), username: "att".into(), joined_at: now, attended: false,
        });
        ev.invited.push(Invitee {
            user_id: "inv".into(), email: "inv@example.com".into(), username: "inv".into(), invited_at: now,
        });
        ev.cohosts.push(Cohost {
            user_id: "co".into(), email: "co@example.com".into(), username: "co".into(), added_at: now,
        });
        ev
    }

    #[test]
    fn attendee_candidates_skip_members_and_invitees() {
        let users = ["host", "att", "inv", "co", "new"].map(summary).to_vec();
        let ids: Vec<_> = filter_candidates(users, &event(), CandidateKind::Attendee)
            .into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["co", "new"]);
    }

    #[test]
    fn cohost_candidates_skip_existing_cohosts_and_creator() {
        let users = ["host", "att", "inv", "co", "new"].map(summary).to_vec();
        let ids: Vec<_> = filter_candidates(users, &event(), CandidateKind::Cohost)
            .into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["att", "inv", "new"]);
    }
}
