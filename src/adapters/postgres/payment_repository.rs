//! PostgreSQL implementation of PaymentIntentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, PaymentId};
use crate::domain::payments::{PaymentIntent, PaymentProvider, PaymentStatus};
use crate::ports::{PaymentIntentRepository, TransitionOutcome};

use super::db_error;

/// PostgreSQL implementation of [`PaymentIntentRepository`].
#[derive(Clone)]
pub struct PostgresPaymentIntentRepository {
    pool: PgPool,
}

impl PostgresPaymentIntentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentIntentRepository for PostgresPaymentIntentRepository {
    async fn insert(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_intents (
                id, booking_id, amount, currency, provider, status,
                provider_transaction_id, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*intent.id.as_uuid())
        .bind(*intent.booking_id.as_uuid())
        .bind(intent.amount)
        .bind(&intent.currency)
        .bind(intent.provider.as_str())
        .bind(intent.status.as_str())
        .bind(&intent.provider_transaction_id)
        .bind(&intent.metadata)
        .bind(intent.created_at)
        .bind(intent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert payment intent", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentIntent>, DomainError> {
        let row: Option<IntentRow> = sqlx::query_as(
            r#"
            SELECT id, booking_id, amount, currency, provider, status,
                   provider_transaction_id, metadata, created_at, updated_at
            FROM payment_intents
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch payment intent", e))?;

        row.map(PaymentIntent::try_from).transpose()
    }

    async fn find_by_provider_txn(
        &self,
        provider: PaymentProvider,
        txn_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        let row: Option<IntentRow> = sqlx::query_as(
            r#"
            SELECT id, booking_id, amount, currency, provider, status,
                   provider_transaction_id, metadata, created_at, updated_at
            FROM payment_intents
            WHERE provider = $1 AND provider_transaction_id = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(txn_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch payment intent by provider txn", e))?;

        row.map(PaymentIntent::try_from).transpose()
    }

    async fn update_issued(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        metadata: &Value,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_intents
            SET status = $2, metadata = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(status.as_str())
        .bind(metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update payment intent", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment intent not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn apply_transition(
        &self,
        id: PaymentId,
        target: PaymentStatus,
        provider_txn_id: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        // Terminal rows are excluded in the predicate itself, so a redelivered
        // callback can never overwrite a finished payment regardless of
        // interleaving.
        let result = sqlx::query(
            r#"
            UPDATE payment_intents
            SET status = $2, provider_transaction_id = $3, updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('completed', 'failed')
            "#,
        )
        .bind(*id.as_uuid())
        .bind(target.as_str())
        .bind(provider_txn_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to apply payment transition", e))?;

        if result.rows_affected() > 0 {
            return Ok(TransitionOutcome::Applied);
        }

        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM payment_intents WHERE id = $1)")
                .bind(*id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to check payment intent existence", e))?;

        if exists.0 {
            Ok(TransitionOutcome::AlreadyTerminal)
        } else {
            Ok(TransitionOutcome::NotFound)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════

#[derive(sqlx::FromRow)]
struct IntentRow {
    id: Uuid,
    booking_id: Uuid,
    amount: i64,
    currency: String,
    provider: String,
    status: String,
    provider_transaction_id: Option<String>,
    metadata: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IntentRow> for PaymentIntent {
    type Error = DomainError;

    fn try_from(row: IntentRow) -> Result<Self, Self::Error> {
        let provider: PaymentProvider = row.provider.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid provider value: {}", row.provider),
            )
        })?;

        Ok(PaymentIntent {
            id: PaymentId::from_uuid(row.id),
            booking_id: BookingId::from_uuid(row.booking_id),
            amount: row.amount,
            currency: row.currency,
            provider,
            status: PaymentStatus::parse(&row.status)?,
            provider_transaction_id: row.provider_transaction_id,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
