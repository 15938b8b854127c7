//! Webhook normalizer: applies canonical provider events to payment
//! intents as idempotent state transitions.
//!
//! The provider-specific parsing lives in `domain::payments::callback`; by
//! the time an event reaches this service it is canonical. Idempotence for
//! at-least-once delivery comes from the store's conditional transition:
//! an intent already in a terminal state absorbs duplicates as no-ops.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payments::{
    CanonicalEvent, Correlation, PaymentIntent, PaymentProvider, PaymentStatus, WebhookResolution,
};
use crate::ports::{BookingStore, PaymentIntentRepository, TransitionOutcome};

/// Pre-flight decision for a provider's dry-run validation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightDecision {
    Allow,
    /// No intent with that correlation id exists.
    UnknownAccount,
    /// The intent exists but is already settled one way or the other.
    UnableToPerform,
}

/// Result of applying a canonical event.
#[derive(Debug, Clone)]
pub struct WebhookAck {
    /// The intent as it stood when the event was resolved.
    pub intent: PaymentIntent,
    /// The status the event asked for.
    pub target: PaymentStatus,
    /// Whether this delivery applied the transition, or found it already done.
    pub outcome: TransitionOutcome,
}

/// Applies canonical webhook events to the payment store.
#[derive(Clone)]
pub struct WebhookService {
    payments: Arc<dyn PaymentIntentRepository>,
    bookings: Arc<dyn BookingStore>,
}

impl WebhookService {
    pub fn new(payments: Arc<dyn PaymentIntentRepository>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { payments, bookings }
    }

    /// Answers a pre-flight validation without mutating anything.
    pub async fn preflight(&self, payment_id: PaymentId) -> Result<PreflightDecision, DomainError> {
        match self.payments.find_by_id(payment_id).await? {
            None => Ok(PreflightDecision::UnknownAccount),
            Some(intent) if intent.status.is_terminal() => Ok(PreflightDecision::UnableToPerform),
            Some(_) => Ok(PreflightDecision::Allow),
        }
    }

    /// Applies a canonical event: resolves the intent, performs the
    /// conditional status transition, and on completion propagates the
    /// derived `payment_status` onto the booking.
    ///
    /// The booking write is dependent and non-fatal: it runs only after the
    /// intent write succeeded, and its failure is logged rather than
    /// surfaced, so providers do not retry an already-applied transition.
    pub async fn apply(
        &self,
        provider: PaymentProvider,
        event: CanonicalEvent,
    ) -> Result<WebhookAck, DomainError> {
        let intent = self.resolve_intent(provider, &event.correlation).await?;

        let target = match event.resolution {
            WebhookResolution::Completed => PaymentStatus::Completed,
            WebhookResolution::Failed => PaymentStatus::Failed,
            WebhookResolution::Processing => PaymentStatus::Processing,
        };

        let outcome = self
            .payments
            .apply_transition(intent.id, target, &event.provider_txn_id)
            .await?;

        if outcome == TransitionOutcome::NotFound {
            // The intent vanished between resolution and update.
            return Err(payment_not_found());
        }

        if outcome == TransitionOutcome::Applied && target == PaymentStatus::Completed {
            if let Err(err) = self.bookings.mark_paid(intent.booking_id).await {
                tracing::error!(
                    payment_id = %intent.id,
                    booking_id = %intent.booking_id,
                    error = %err,
                    "payment completed but booking payment_status update failed"
                );
            }
        }

        Ok(WebhookAck {
            intent,
            target,
            outcome,
        })
    }

    async fn resolve_intent(
        &self,
        provider: PaymentProvider,
        correlation: &Correlation,
    ) -> Result<PaymentIntent, DomainError> {
        let found = match correlation {
            Correlation::Payment(id) => self.payments.find_by_id(*id).await?,
            Correlation::ProviderTxn(txn) => {
                self.payments.find_by_provider_txn(provider, txn).await?
            }
        };
        found.ok_or_else(payment_not_found)
    }
}

fn payment_not_found() -> DomainError {
    DomainError::new(
        ErrorCode::PaymentNotFound,
        "Callback references no known payment",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use crate::domain::foundation::BookingId;
    use crate::ports::BookingSummary;

    /// In-memory payment repository enforcing the conditional transition.
    struct MockPayments {
        intents: Mutex<Vec<PaymentIntent>>,
    }

    impl MockPayments {
        fn with(intent: PaymentIntent) -> Self {
            Self {
                intents: Mutex::new(vec![intent]),
            }
        }

        fn status_of(&self, id: PaymentId) -> PaymentStatus {
            self.intents
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == id)
                .unwrap()
                .status
        }
    }

    #[async_trait]
    impl PaymentIntentRepository for MockPayments {
        async fn insert(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
            self.intents.lock().unwrap().push(intent.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentIntent>, DomainError> {
            Ok(self
                .intents
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == id)
                .cloned())
        }

        async fn find_by_provider_txn(
            &self,
            provider: PaymentProvider,
            txn_id: &str,
        ) -> Result<Option<PaymentIntent>, DomainError> {
            Ok(self
                .intents
                .lock()
                .unwrap()
                .iter()
                .find(|i| {
                    i.provider == provider
                        && i.provider_transaction_id.as_deref() == Some(txn_id)
                })
                .cloned())
        }

        async fn update_issued(
            &self,
            _id: PaymentId,
            _status: PaymentStatus,
            _metadata: &Value,
        ) -> Result<(), DomainError> {
            unreachable!("not used by the normalizer")
        }

        async fn apply_transition(
            &self,
            id: PaymentId,
            target: PaymentStatus,
            provider_txn_id: &str,
        ) -> Result<TransitionOutcome, DomainError> {
            let mut intents = self.intents.lock().unwrap();
            match intents.iter_mut().find(|i| i.id == id) {
                None => Ok(TransitionOutcome::NotFound),
                Some(intent) if intent.status.is_terminal() => {
                    Ok(TransitionOutcome::AlreadyTerminal)
                }
                Some(intent) => {
                    intent.status = target;
                    intent.provider_transaction_id = Some(provider_txn_id.to_string());
                    Ok(TransitionOutcome::Applied)
                }
            }
        }
    }

    struct MockBookings {
        paid_calls: AtomicU32,
        fail: bool,
    }

    impl MockBookings {
        fn new() -> Self {
            Self {
                paid_calls: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                paid_calls: AtomicU32::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl BookingStore for MockBookings {
        async fn find_summary(
            &self,
            _id: BookingId,
        ) -> Result<Option<BookingSummary>, DomainError> {
            Ok(None)
        }

        async fn mark_paid(&self, _id: BookingId) -> Result<(), DomainError> {
            self.paid_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DomainError::database("connection reset"))
            } else {
                Ok(())
            }
        }
    }

    fn processing_intent() -> PaymentIntent {
        let mut intent = PaymentIntent::new(BookingId::new(), 500_000, PaymentProvider::Click);
        intent.transition_to(PaymentStatus::Processing).unwrap();
        intent
    }

    fn completed_event(id: PaymentId) -> CanonicalEvent {
        CanonicalEvent {
            correlation: Correlation::Payment(id),
            provider_txn_id: "T1".to_string(),
            resolution: WebhookResolution::Completed,
        }
    }

    #[tokio::test]
    async fn completion_applies_transition_and_marks_booking_paid() {
        let intent = processing_intent();
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments.clone(), bookings.clone());

        let ack = service
            .apply(PaymentProvider::Click, completed_event(id))
            .await
            .unwrap();

        assert_eq!(ack.outcome, TransitionOutcome::Applied);
        assert_eq!(payments.status_of(id), PaymentStatus::Completed);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_a_noop_with_one_booking_write() {
        let intent = processing_intent();
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments.clone(), bookings.clone());

        let first = service
            .apply(PaymentProvider::Click, completed_event(id))
            .await
            .unwrap();
        let second = service
            .apply(PaymentProvider::Click, completed_event(id))
            .await
            .unwrap();

        assert_eq!(first.outcome, TransitionOutcome::Applied);
        assert_eq!(second.outcome, TransitionOutcome::AlreadyTerminal);
        assert_eq!(payments.status_of(id), PaymentStatus::Completed);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_booking_write_does_not_fail_the_webhook() {
        let intent = processing_intent();
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::failing());
        let service = WebhookService::new(payments.clone(), bookings.clone());

        let ack = service
            .apply(PaymentProvider::Click, completed_event(id))
            .await
            .unwrap();

        assert_eq!(ack.outcome, TransitionOutcome::Applied);
        assert_eq!(payments.status_of(id), PaymentStatus::Completed);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_correlation_is_an_error_without_booking_write() {
        let payments = Arc::new(MockPayments::with(processing_intent()));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments, bookings.clone());

        let err = service
            .apply(PaymentProvider::Click, completed_event(PaymentId::new()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentNotFound);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_event_marks_intent_failed_without_booking_write() {
        let intent = processing_intent();
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments.clone(), bookings.clone());

        let ack = service
            .apply(
                PaymentProvider::Click,
                CanonicalEvent {
                    correlation: Correlation::Payment(id),
                    provider_txn_id: "T2".to_string(),
                    resolution: WebhookResolution::Failed,
                },
            )
            .await
            .unwrap();

        assert_eq!(ack.outcome, TransitionOutcome::Applied);
        assert_eq!(payments.status_of(id), PaymentStatus::Failed);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_txn_correlation_resolves_through_the_attached_id() {
        let mut intent = processing_intent();
        intent.provider = PaymentProvider::Payme;
        intent.provider_transaction_id = Some("payme-txn-9".to_string());
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments.clone(), bookings);

        let ack = service
            .apply(
                PaymentProvider::Payme,
                CanonicalEvent {
                    correlation: Correlation::ProviderTxn("payme-txn-9".to_string()),
                    provider_txn_id: "payme-txn-9".to_string(),
                    resolution: WebhookResolution::Completed,
                },
            )
            .await
            .unwrap();

        assert_eq!(ack.intent.id, id);
        assert_eq!(payments.status_of(id), PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn preflight_never_mutates_state() {
        let intent = processing_intent();
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let bookings = Arc::new(MockBookings::new());
        let service = WebhookService::new(payments.clone(), bookings.clone());

        assert_eq!(
            service.preflight(id).await.unwrap(),
            PreflightDecision::Allow
        );
        assert_eq!(
            service.preflight(PaymentId::new()).await.unwrap(),
            PreflightDecision::UnknownAccount
        );
        assert_eq!(payments.status_of(id), PaymentStatus::Processing);
        assert_eq!(bookings.paid_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn preflight_denies_settled_intents() {
        let mut intent = processing_intent();
        intent.status = PaymentStatus::Completed;
        let id = intent.id;
        let payments = Arc::new(MockPayments::with(intent));
        let service = WebhookService::new(payments, Arc::new(MockBookings::new()));

        assert_eq!(
            service.preflight(id).await.unwrap(),
            PreflightDecision::UnableToPerform
        );
    }
}
