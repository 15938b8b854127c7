//! QR payment sessions: time-boxed, token-authorized scan-to-pay requests.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookingId, QrSessionId, VendorId};
use crate::domain::payments::INTENT_CURRENCY;

/// Fixed length of a QR capability token.
pub const QR_TOKEN_LEN: usize = 16;

/// Token alphabet: alphanumerics minus the visually confusable
/// `0`, `O`, `1`, `l`, `I`.
pub const QR_TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Default session lifetime in minutes.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 30;

/// Allowed session lifetime bounds in minutes.
pub const MIN_EXPIRY_MINUTES: i64 = 5;
pub const MAX_EXPIRY_MINUTES: i64 = 1440;

/// Generates an opaque capability token from the unambiguous alphabet.
///
/// Callers must pass a cryptographically secure generator; the production
/// path uses `rand::rngs::OsRng`.
pub fn generate_qr_token<R: Rng>(rng: &mut R) -> String {
    (0..QR_TOKEN_LEN)
        .map(|_| QR_TOKEN_ALPHABET[rng.gen_range(0..QR_TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Applies the default and clamps a requested lifetime into the allowed range.
pub fn clamp_expiry_minutes(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_EXPIRY_MINUTES)
        .clamp(MIN_EXPIRY_MINUTES, MAX_EXPIRY_MINUTES)
}

/// Session status: `Active` until consumed by a scan or expired by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrSessionStatus {
    Active,
    Consumed,
    Expired,
}

impl QrSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrSessionStatus::Active => "active",
            QrSessionStatus::Consumed => "consumed",
            QrSessionStatus::Expired => "expired",
        }
    }
}

/// A vendor-created request for a one-time scannable payment.
///
/// The `qr_token` is the sole authorization artifact for the redemption
/// endpoint; nothing else gates a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrPaymentSession {
    pub id: QrSessionId,
    pub booking_id: Option<BookingId>,
    pub vendor_id: VendorId,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub qr_token: String,
    pub qr_image_url: Option<String>,
    pub status: QrSessionStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl QrPaymentSession {
    /// Creates an active session expiring `expires_in_minutes` from now.
    pub fn new(
        vendor_id: VendorId,
        booking_id: Option<BookingId>,
        amount: i64,
        description: Option<String>,
        expires_in_minutes: i64,
        qr_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: QrSessionId::new(),
            booking_id,
            vendor_id,
            amount,
            currency: INTENT_CURRENCY.to_string(),
            description,
            qr_token,
            qr_image_url: None,
            status: QrSessionStatus::Active,
            expires_at: now + Duration::minutes(expires_in_minutes),
            created_at: now,
        }
    }

    /// Whether the session is still redeemable at `at`.
    pub fn is_redeemable(&self, at: DateTime<Utc>) -> bool {
        self.status == QrSessionStatus::Active && at < self.expires_at
    }
}
