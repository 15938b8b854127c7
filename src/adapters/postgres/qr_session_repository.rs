//! PostgreSQL implementation of QrSessionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::payments::QrPaymentSession;
use crate::ports::QrSessionRepository;

use super::db_error;

/// PostgreSQL implementation of [`QrSessionRepository`].
#[derive(Clone)]
pub struct PostgresQrSessionRepository {
    pool: PgPool,
}

impl PostgresQrSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QrSessionRepository for PostgresQrSessionRepository {
    async fn insert(&self, session: &QrPaymentSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO qr_payment_sessions (
                id, booking_id, vendor_id, amount, currency, description,
                qr_token, qr_image_url, status, expires_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*session.id.as_uuid())
        .bind(session.booking_id.map(|b| *b.as_uuid()))
        .bind(*session.vendor_id.as_uuid())
        .bind(session.amount)
        .bind(&session.currency)
        .bind(&session.description)
        .bind(&session.qr_token)
        .bind(&session.qr_image_url)
        .bind(session.status.as_str())
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert QR payment session", e))?;

        Ok(())
    }
}
