//! Payment session issuer: payment intents with provider checkout links,
//! and vendor QR payment sessions.

use std::sync::Arc;

use rand::rngs::OsRng;
use serde_json::json;

use crate::domain::foundation::{AuthenticatedUser, BookingId, DomainError, ErrorCode, PaymentId};
use crate::domain::payments::{
    clamp_expiry_minutes, generate_qr_token, PaymentIntent, PaymentProvider, PaymentStatus,
    QrPaymentSession, MAX_AMOUNT_UZS,
};
use crate::ports::{
    BookingStore, CheckoutBuilder, PaymentIntentRepository, QrSessionRepository, VendorDirectory,
};

/// Request to create a payment intent for a booking.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub booking_id: BookingId,
    pub amount: i64,
    pub provider: PaymentProvider,
    pub return_url: String,
}

/// Result of issuing a payment intent.
#[derive(Debug, Clone)]
pub struct IssuedPayment {
    pub payment_id: PaymentId,
    pub payment_url: String,
    pub provider: PaymentProvider,
}

/// Request to create a QR payment session.
#[derive(Debug, Clone)]
pub struct CreateQrSessionCommand {
    pub booking_id: Option<BookingId>,
    pub amount: i64,
    pub description: Option<String>,
    pub expires_in_minutes: Option<i64>,
}

/// Result of issuing a QR session.
#[derive(Debug, Clone)]
pub struct IssuedQrSession {
    pub session: QrPaymentSession,
    pub payment_url: String,
}

/// Issues payment intents and QR sessions.
#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentIntentRepository>,
    bookings: Arc<dyn BookingStore>,
    vendors: Arc<dyn VendorDirectory>,
    qr_sessions: Arc<dyn QrSessionRepository>,
    links: Arc<dyn CheckoutBuilder>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentIntentRepository>,
        bookings: Arc<dyn BookingStore>,
        vendors: Arc<dyn VendorDirectory>,
        qr_sessions: Arc<dyn QrSessionRepository>,
        links: Arc<dyn CheckoutBuilder>,
    ) -> Self {
        Self {
            payments,
            bookings,
            vendors,
            qr_sessions,
            links,
        }
    }

    /// Creates a payment intent for a booking the caller owns.
    ///
    /// Exactly one insert and one follow-up update: the intent is created
    /// `pending`, the checkout URL is built locally, then the intent moves to
    /// `processing` with provider metadata merged in.
    pub async fn create_payment(
        &self,
        cmd: CreatePaymentCommand,
        caller: &AuthenticatedUser,
    ) -> Result<IssuedPayment, DomainError> {
        validate_amount(cmd.amount)?;

        let booking = self
            .bookings
            .find_summary(cmd.booking_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::BookingNotFound, "Referenced booking does not exist")
            })?;
        if booking.couple_user_id != caller.id {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Caller does not own the referenced booking",
            ));
        }

        let mut intent = PaymentIntent::new(cmd.booking_id, cmd.amount, cmd.provider);
        self.payments.insert(&intent).await?;

        let payment_url = self.links.checkout_url(&intent, &cmd.return_url)?;
        intent.merge_metadata(&json!({
            "checkout_url": payment_url,
            "return_url": cmd.return_url,
        }));
        intent.transition_to(PaymentStatus::Processing)?;
        self.payments
            .update_issued(intent.id, intent.status, &intent.metadata)
            .await?;

        Ok(IssuedPayment {
            payment_id: intent.id,
            payment_url,
            provider: cmd.provider,
        })
    }

    /// Creates a QR payment session for a caller with a vendor profile.
    pub async fn create_qr_session(
        &self,
        cmd: CreateQrSessionCommand,
        caller: &AuthenticatedUser,
    ) -> Result<IssuedQrSession, DomainError> {
        validate_amount(cmd.amount)?;

        let vendor_id = self
            .vendors
            .vendor_id_for_user(caller.id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::NotAVendor, "Caller has no vendor profile")
            })?;

        let token = generate_qr_token(&mut OsRng);
        let mut session = QrPaymentSession::new(
            vendor_id,
            cmd.booking_id,
            cmd.amount,
            cmd.description,
            clamp_expiry_minutes(cmd.expires_in_minutes),
            token,
        );
        let payment_url = self.links.qr_payment_url(&session.qr_token);
        session.qr_image_url = Some(self.links.qr_image_url(&payment_url));

        self.qr_sessions.insert(&session).await?;

        Ok(IssuedQrSession {
            session,
            payment_url,
        })
    }
}

fn validate_amount(amount: i64) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation("amount", "Amount must be positive"));
    }
    if amount > MAX_AMOUNT_UZS {
        return Err(DomainError::validation(
            "amount",
            format!("Amount exceeds the maximum of {} UZS", MAX_AMOUNT_UZS),
        ));
    }
    Ok(())
}
