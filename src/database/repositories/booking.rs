use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Booking, BookingInput, BookingStatus, TeamAssignment};
use crate::database::repositories::BookingStore;
use crate::database::types::BookingRow;
use crate::error::SchedulingError;

const BOOKING_COLUMNS: &str = "id, provider_id, client_id, event_date, start_minutes, end_minutes, \
     status, team_member_ids, equipment_ids, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn create_booking(&self, input: BookingInput) -> Result<Booking, SchedulingError> {
        if input.end_time <= input.start_time {
            return Err(SchedulingError::InvalidInterval {
                start: input.start_time,
                end: input.end_time,
            });
        }

        let now = Utc::now();
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (id, provider_id, client_id, event_date, start_minutes, end_minutes, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.provider_id)
        .bind(input.client_id)
        .bind(input.event_date)
        .bind(input.start_time.minutes() as i16)
        .bind(input.end_time.minutes() as i16)
        .bind(BookingStatus::Pending)
        .bind(input.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, SchedulingError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_for_provider_on_date(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, SchedulingError> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE provider_id = $1 AND event_date = $2 AND status = ANY($3)
            ORDER BY start_minutes
            "#
        ))
        .bind(provider_id)
        .bind(date)
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    async fn confirm_assignment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        assignment: TeamAssignment,
    ) -> Result<Option<Booking>, SchedulingError> {
        // Single conditional UPDATE: status and assignment land together or
        // not at all, and only while the status precondition still holds.
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, team_member_ids = $2, equipment_ids = $3, updated_at = $4
            WHERE id = $5 AND status = $6
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(next)
        .bind(&assignment.team_member_ids)
        .bind(&assignment.equipment_ids)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_none() {
            log::warn!(
                "Conditional assignment update on booking {} lost: status was no longer {}",
                id,
                expected
            );
        }

        Ok(row.map(|r| r.into()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }
}
