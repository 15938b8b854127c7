//! Payment domain: intents, QR sessions, providers, and callback
//! normalization.

mod callback;
mod intent;
mod provider;
mod qr_session;

pub use callback::{
    CallbackError, CanonicalEvent, ClickCallback, Correlation, GenericCallback, PaymeAction,
    PaymeAccount, PaymeMethod, PaymeParams, PaymeRequest, ProviderCallback, WebhookResolution,
};
pub use intent::{PaymentIntent, PaymentStatus, INTENT_CURRENCY, MAX_AMOUNT_UZS};
pub use provider::{PaymentProvider, UnknownProvider};
pub use qr_session::{
    clamp_expiry_minutes, generate_qr_token, QrPaymentSession, QrSessionStatus,
    DEFAULT_EXPIRY_MINUTES, MAX_EXPIRY_MINUTES, MIN_EXPIRY_MINUTES, QR_TOKEN_ALPHABET,
    QR_TOKEN_LEN,
};
