//! PostgreSQL implementation of BookingStore.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, UserId};
use crate::ports::{BookingStore, BookingSummary};

use super::db_error;

/// PostgreSQL implementation of [`BookingStore`].
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_summary(&self, id: BookingId) -> Result<Option<BookingSummary>, DomainError> {
        let row: Option<(Uuid, Uuid, String)> = sqlx::query_as(
            "SELECT id, couple_user_id, payment_status FROM bookings WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch booking", e))?;

        Ok(row.map(|(id, couple_user_id, payment_status)| BookingSummary {
            id: BookingId::from_uuid(id),
            couple_user_id: UserId::from_uuid(couple_user_id),
            payment_status,
        }))
    }

    async fn mark_paid(&self, id: BookingId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_status = 'paid', updated_at = NOW() WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark booking paid", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking not found: {}", id),
            ));
        }

        Ok(())
    }
}
