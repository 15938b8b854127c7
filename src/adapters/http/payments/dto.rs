//! DTOs for payment endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{IssuedPayment, IssuedQrSession};
use crate::domain::foundation::BookingId;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub booking_id: BookingId,
    /// Amount in UZS soum.
    pub amount: i64,
    /// Provider name: payme, click, uzum, or paynet.
    pub provider: String,
    /// Where the provider redirects the payer afterwards.
    #[serde(default)]
    pub return_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQrSessionRequest {
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    pub amount: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expires_in_minutes: Option<i64>,
}

/// Provider selector for the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookParams {
    pub provider: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentResponse {
    pub payment_id: String,
    pub payment_url: String,
    pub provider: String,
    pub status: String,
}

impl From<IssuedPayment> for CreatePaymentResponse {
    fn from(issued: IssuedPayment) -> Self {
        Self {
            payment_id: issued.payment_id.to_string(),
            payment_url: issued.payment_url,
            provider: issued.provider.as_str().to_string(),
            status: "processing".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QrSessionResponse {
    pub session_id: String,
    pub qr_token: String,
    pub payment_url: String,
    pub qr_image_url: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedQrSession> for QrSessionResponse {
    fn from(issued: IssuedQrSession) -> Self {
        let session = issued.session;
        Self {
            session_id: session.id.to_string(),
            qr_token: session.qr_token,
            payment_url: issued.payment_url,
            qr_image_url: session.qr_image_url,
            amount: session.amount,
            currency: session.currency,
            status: session.status.as_str().to_string(),
            expires_at: session.expires_at,
        }
    }
}
