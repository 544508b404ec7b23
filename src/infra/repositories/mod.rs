pub mod sqlite_event_repo;
pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;

pub mod postgres_event_repo;
pub mod postgres_user_repo;
pub mod postgres_auth_repo;

use std::collections::HashMap;
use crate::domain::models::event::{AttendeeRow, CohostRow, Event, EventRow, InviteeRow};
use crate::error::AppError;

/// Stitches a date-ordered list of event rows together with their membership rows.
pub(crate) fn assemble_events(
    rows: Vec<EventRow>,
    cohosts: Vec<CohostRow>,
    invites: Vec<InviteeRow>,
    attendees: Vec<AttendeeRow>,
) -> Result<Vec<Event>, AppError> {
    let mut cohosts_by_event: HashMap<String, Vec<_>> = HashMap::new();
    for row in cohosts {
        cohosts_by_event.entry(row.event_id).or_default().push(row.cohost);
    }
    let mut invites_by_event: HashMap<String, Vec<_>> = HashMap::new();
    for row in invites {
        invites_by_event.entry(row.event_id).or_default().push(row.invitee);
    }
    let mut attendees_by_event: HashMap<String, Vec<_>> = HashMap::new();
    for row in attendees {
        attendees_by_event.entry(row.event_id).or_default().push(row.attendee);
    }

    rows.into_iter()
        .map(|row| {
            let cohosts = cohosts_by_event.remove(&row.id).unwrap_or_default();
            let invited = invites_by_event.remove(&row.id).unwrap_or_default();
            let attendees = attendees_by_event.remove(&row.id).unwrap_or_default();
            row.into_event(cohosts, invited, attendees)
        })
        .collect()
}
