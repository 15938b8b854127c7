//! Ports for payment intents, QR sessions, bookings, and vendor lookup.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{BookingId, DomainError, PaymentId, UserId, VendorId};
use crate::domain::payments::{PaymentIntent, PaymentProvider, PaymentStatus, QrPaymentSession};

/// The slice of a booking row this core reads and writes.
#[derive(Debug, Clone)]
pub struct BookingSummary {
    pub id: BookingId,
    pub couple_user_id: UserId,
    pub payment_status: String,
}

/// Read/write access to bookings, limited to what payments need.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_summary(&self, id: BookingId) -> Result<Option<BookingSummary>, DomainError>;

    /// Sets the booking's derived `payment_status` to `paid`.
    async fn mark_paid(&self, id: BookingId) -> Result<(), DomainError>;
}

/// Outcome of a conditional status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was applied by this call.
    Applied,
    /// The intent was already in a terminal state; nothing changed.
    AlreadyTerminal,
    /// No intent with that id exists.
    NotFound,
}

/// Persistence for payment intents.
#[async_trait]
pub trait PaymentIntentRepository: Send + Sync {
    async fn insert(&self, intent: &PaymentIntent) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentIntent>, DomainError>;

    /// Finds the intent a provider transaction id was previously attached to.
    async fn find_by_provider_txn(
        &self,
        provider: PaymentProvider,
        txn_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError>;

    /// Persists the issuer's post-creation update: status and metadata.
    async fn update_issued(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        metadata: &Value,
    ) -> Result<(), DomainError>;

    /// Conditionally applies a webhook transition: the status and provider
    /// transaction id are written only if the intent is not already
    /// terminal. This is the store-level idempotence guarantee for
    /// at-least-once webhook delivery.
    async fn apply_transition(
        &self,
        id: PaymentId,
        target: PaymentStatus,
        provider_txn_id: &str,
    ) -> Result<TransitionOutcome, DomainError>;
}

/// Persistence for QR payment sessions.
#[async_trait]
pub trait QrSessionRepository: Send + Sync {
    async fn insert(&self, session: &QrPaymentSession) -> Result<(), DomainError>;
}

/// Resolves a platform user to their vendor profile, if any.
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    async fn vendor_id_for_user(&self, user: UserId) -> Result<Option<VendorId>, DomainError>;
}
