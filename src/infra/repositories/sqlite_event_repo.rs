use crate::domain::{
    models::event::{
        Attendee, AttendeeRow, Cohost, CohostRow, Event, EventDetails, EventRow, Invitee,
        InviteeRow, JoinOutcome,
    },
    ports::EventRepository,
};
use crate::error::AppError;
use crate::infra::repositories::assemble_events;
use async_trait::async_trait;
use sqlx::SqlitePool;

const EVENT_COLUMNS: &str = "id, title, date, start_time, end_time, location, description, image_url, \
    capacity, creator_id, creator_email, status, created_at";

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let d = &event.details;
        sqlx::query(
            r#"INSERT INTO events (
                id, title, date, start_time, end_time, location, description, image_url,
                capacity, creator_id, creator_email, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
            .bind(&event.id)
            .bind(&d.title)
            .bind(d.date)
            .bind(&d.start_time)
            .bind(&d.end_time)
            .bind(&d.location)
            .bind(&d.description)
            .bind(&d.image_url)
            .bind(d.capacity)
            .bind(&event.creator_id)
            .bind(&event.creator_email)
            .bind(event.status.as_str())
            .bind(event.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.find_by_id(&event.id).await?
            .ok_or(AppError::InternalWithMsg("Created event vanished".into()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>(
            &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let Some(row) = row else { return Ok(None) };

        let cohosts = sqlx::query_as::<_, Cohost>(
            "SELECT user_id, email, username, added_at FROM event_cohosts WHERE event_id = ? ORDER BY added_at ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let invited = sqlx::query_as::<_, Invitee>(
            "SELECT user_id, email, username, invited_at FROM event_invites WHERE event_id = ? ORDER BY invited_at ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let attendees = sqlx::query_as::<_, Attendee>(
            "SELECT user_id, email, username, joined_at, attended FROM event_attendees WHERE event_id = ? ORDER BY joined_at ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.into_event(cohosts, invited, attendees).map(Some)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query_as::<_, EventRow>(
            &format!("SELECT {} FROM events ORDER BY date ASC, created_at ASC", EVENT_COLUMNS),
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let cohosts = sqlx::query_as::<_, CohostRow>(
            "SELECT event_id, user_id, email, username, added_at FROM event_cohosts ORDER BY added_at ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let invites = sqlx::query_as::<_, InviteeRow>(
            "SELECT event_id, user_id, email, username, invited_at FROM event_invites ORDER BY invited_at ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let attendees = sqlx::query_as::<_, AttendeeRow>(
            "SELECT event_id, user_id, email, username, joined_at, attended FROM event_attendees ORDER BY joined_at ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        assemble_events(rows, cohosts, invites, attendees)
    }

    async fn update_details(&self, id: &str, details: &EventDetails) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE events SET
                title=?, date=?, start_time=?, end_time=?, location=?,
                description=?, image_url=?, capacity=?
               WHERE id=?"#
        )
            .bind(&details.title)
            .bind(details.date)
            .bind(&details.start_time)
            .bind(&details.end_time)
            .bind(&details.location)
            .bind(&details.description)
            .bind(&details.image_url)
            .bind(details.capacity)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn mark_completed(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE events SET status = 'completed' WHERE id = ? AND status <> 'completed'")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn add_attendee_within_capacity(&self, event_id: &str, attendee: &Attendee) -> Result<JoinOutcome, AppError> {
        // Count, ceiling and insert are one statement; SQLite serializes writers.
        let result = sqlx::query(
            r#"INSERT INTO event_attendees (event_id, user_id, email, username, joined_at, attended)
               SELECT ?, ?, ?, ?, ?, ?
               WHERE (SELECT COUNT(*) FROM event_attendees WHERE event_id = ?)
                     < (SELECT capacity FROM events WHERE id = ?)
               ON CONFLICT (event_id, user_id) DO NOTHING"#
        )
            .bind(event_id)
            .bind(&attendee.user_id)
            .bind(&attendee.email)
            .bind(&attendee.username)
            .bind(attendee.joined_at)
            .bind(attendee.attended)
            .bind(event_id)
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            return Ok(JoinOutcome::Joined);
        }

        let present: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_attendees WHERE event_id = ? AND user_id = ?",
        )
            .bind(event_id)
            .bind(&attendee.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(if present > 0 { JoinOutcome::AlreadyJoined } else { JoinOutcome::Full })
    }

    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM event_attendees WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_attendance(&self, event_id: &str, user_id: &str) -> Result<Option<bool>, AppError> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE event_attendees SET attended = NOT attended WHERE event_id = ? AND user_id = ? RETURNING attended",
        )
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn add_invitee(&self, event_id: &str, invitee: &Invitee) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO event_invites (event_id, user_id, email, username, invited_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (event_id, user_id) DO NOTHING"#
        )
            .bind(event_id)
            .bind(&invitee.user_id)
            .bind(&invitee.email)
            .bind(&invitee.username)
            .bind(invitee.invited_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn accept_invitation(&self, event_id: &str, attendee: &Attendee) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let removed = sqlx::query("DELETE FROM event_invites WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(&attendee.user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if removed.rows_affected() == 0 {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(false);
        }

        sqlx::query(
            r#"INSERT INTO event_attendees (event_id, user_id, email, username, joined_at, attended)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (event_id, user_id) DO NOTHING"#
        )
            .bind(event_id)
            .bind(&attendee.user_id)
            .bind(&attendee.email)
            .bind(&attendee.username)
            .bind(attendee.joined_at)
            .bind(attendee.attended)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(true)
    }

    async fn add_cohost(&self, event_id: &str, cohost: &Cohost) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO event_cohosts (event_id, user_id, email, username, added_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (event_id, user_id) DO NOTHING"#
        )
            .bind(event_id)
            .bind(&cohost.user_id)
            .bind(&cohost.email)
            .bind(&cohost.username)
            .bind(cohost.added_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_cohost(&self, event_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM event_cohosts WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
