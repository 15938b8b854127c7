//! Port for building provider-facing payment links.

use crate::domain::foundation::DomainError;
use crate::domain::payments::PaymentIntent;

/// Builds redirect/QR targets for payment flows.
///
/// All construction is local string/URL assembly against configured merchant
/// identifiers; implementations make no network calls.
pub trait CheckoutBuilder: Send + Sync {
    /// Provider checkout URL carrying the intent id as the provider's
    /// correlation token.
    fn checkout_url(&self, intent: &PaymentIntent, return_url: &str)
        -> Result<String, DomainError>;

    /// Scan-to-pay redemption URL embedding a QR session token.
    fn qr_payment_url(&self, qr_token: &str) -> String;

    /// URL of a rendered QR image for the given payment URL.
    fn qr_image_url(&self, payment_url: &str) -> String;
}
