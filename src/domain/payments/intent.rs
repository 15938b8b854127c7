//! Payment intent entity and its status state machine.
//!
//! Lifecycle: `Pending -> Processing -> Completed`, with `Failed` reachable
//! from any non-terminal state. `Completed` and `Failed` are terminal; a
//! duplicate provider callback against a terminal intent is acknowledged as
//! a no-op, never re-applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, PaymentId};
use crate::domain::payments::PaymentProvider;

/// Currency every intent is denominated in.
pub const INTENT_CURRENCY: &str = "UZS";

/// Largest accepted amount in UZS soum. Keeps the tiyin conversion
/// (`amount * 100`) comfortably inside `i64` and bounds what a single
/// request can ask a provider to charge.
pub const MAX_AMOUNT_UZS: i64 = 100_000_000_000;

/// Finite status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment status value: {}", other),
            )),
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    /// Whether the transition `self -> target` is legal.
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        use PaymentStatus::*;
        match (self, target) {
            (Pending, Processing) | (Pending, Completed) | (Pending, Failed) => true,
            (Processing, Completed) | (Processing, Failed) => true,
            _ => false,
        }
    }
}

/// A payment attempt against a booking, independent of provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentId,
    pub booking_id: BookingId,
    /// Amount in UZS soum.
    pub amount: i64,
    pub currency: String,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub provider_transaction_id: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    /// Creates a fresh intent in `Pending` status.
    pub fn new(booking_id: BookingId, amount: i64, provider: PaymentProvider) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            booking_id,
            amount,
            currency: INTENT_CURRENCY.to_string(),
            provider,
            status: PaymentStatus::Pending,
            provider_transaction_id: None,
            metadata: Value::Object(serde_json::Map::new()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the given object's keys into the intent metadata,
    /// overwriting on conflict.
    pub fn merge_metadata(&mut self, extra: &Value) {
        if let (Value::Object(base), Value::Object(add)) = (&mut self.metadata, extra) {
            for (k, v) in add {
                base.insert(k.clone(), v.clone());
            }
        }
    }

    /// Applies a status transition, rejecting illegal ones.
    pub fn transition_to(&mut self, target: PaymentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move payment from {} to {}", self.status.as_str(), target.as_str()),
            ));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}
