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
use sqlx::PgPool;

const EVENT_COLUMNS: &str = "id, title, date, start_time, end_time, location, description, image_url, \
    capacity, creator_id, creator_email, status, created_at";

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let d = &event.details;
        sqlx::query(
            r#"INSERT INTO events (
                id, title, date, start_time, end_time, location, description, image_url,
                capacity, creator_id, creator_email, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#
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
            &format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS),
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let Some(row) = row else { return Ok(None) };

        let cohosts = sqlx::query_as::<_, Cohost>(
            "SELECT user_id, email, username, added_at FROM event_cohosts WHERE event_id = $1 ORDER BY added_at ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let invited = sqlx::query_as::<_, Invitee>(
            "SELECT user_id, email, username, invited_at FROM event_invites WHERE event_id = $1 ORDER BY invited_at ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let attendees = sqlx::query_as::<_, Attendee>(
            "SELECT user_id, email, username, joined_at, attended FROM event_attendees WHERE event_id = $1 ORDER BY joined_at ASC",
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
                title=$1, date=$2, start_time=$3, end_time=$4, location=$5,
                description=$6, image_url=$7, capacity=$8
               WHERE id=$9"#
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
        let result = sqlx::query("UPDATE events SET status = 'completed' WHERE id = $1 AND status <> 'completed'")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
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
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the event serializes concurrent joins under READ COMMITTED.
        let capacity: i32 = sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM event_attendees WHERE event_id = $1 AND user_id = $2)",
        )
            .bind(event_id)
            .bind(&attendee.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if present {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(JoinOutcome::AlreadyJoined);
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if count >= capacity as i64 {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(JoinOutcome::Full);
        }

        sqlx::query(
            r#"INSERT INTO event_attendees (event_id, user_id, email, username, joined_at, attended)
               VALUES ($1, $2, $3, $4, $5, $6)"#
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
        Ok(JoinOutcome::Joined)
    }

    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM event_attendees WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_attendance(&self, event_id: &str, user_id: &str) -> Result<Option<bool>, AppError> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE event_attendees SET attended = NOT attended WHERE event_id = $1 AND user_id = $2 RETURNING attended",
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
               VALUES ($1, $2, $3, $4, $5)
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

        let removed = sqlx::query("DELETE FROM event_invites WHERE event_id = $1 AND user_id = $2")
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
               VALUES ($1, $2, $3, $4, $5, $6)
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
               VALUES ($1, $2, $3, $4, $5)
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
        let result = sqlx::query("DELETE FROM event_cohosts WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
