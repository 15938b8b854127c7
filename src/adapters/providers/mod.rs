//! Checkout link construction for the supported payment networks.
//!
//! Implements the [`CheckoutBuilder`] port by assembling each provider's
//! redirect URL from configured merchant identifiers. The payment intent id
//! is embedded as the provider's correlation token so the webhook normalizer
//! can route callbacks back to the intent.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use url::Url;

use crate::config::PaymentConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payments::{PaymentIntent, PaymentProvider};
use crate::ports::CheckoutBuilder;

/// Payme hosted checkout base.
const PAYME_CHECKOUT_BASE: &str = "https://checkout.paycom.uz";

/// Click hosted checkout endpoint.
const CLICK_CHECKOUT_URL: &str = "https://my.click.uz/services/pay";

/// Builds provider redirect and QR URLs from static merchant configuration.
#[derive(Clone)]
pub struct MerchantLinks {
    config: PaymentConfig,
}

impl MerchantLinks {
    pub fn new(config: PaymentConfig) -> Self {
        Self { config }
    }

    /// Payme encodes its checkout parameters as base64 path segment:
    /// `m=<merchant>;ac.booking_id=<intent>;a=<amount in tiyin>`.
    fn payme_url(&self, intent: &PaymentIntent) -> Result<String, DomainError> {
        let tiyin = intent.amount.checked_mul(100).ok_or_else(|| {
            DomainError::validation("amount", "Amount overflows the tiyin conversion")
        })?;
        let params = format!(
            "m={};ac.booking_id={};a={}",
            self.config.payme_merchant_id, intent.id, tiyin,
        );
        Ok(format!("{}/{}", PAYME_CHECKOUT_BASE, BASE64.encode(params)))
    }

    fn click_url(&self, intent: &PaymentIntent, return_url: &str) -> Result<String, DomainError> {
        let mut url = parse_base(CLICK_CHECKOUT_URL)?;
        url.query_pairs_mut()
            .append_pair("service_id", &self.config.click_service_id)
            .append_pair("merchant_id", &self.config.click_merchant_id)
            .append_pair("amount", &intent.amount.to_string())
            .append_pair("transaction_param", &intent.id.to_string())
            .append_pair("return_url", return_url);
        Ok(url.into())
    }

    fn generic_url(
        &self,
        base: &str,
        intent: &PaymentIntent,
        return_url: &str,
    ) -> Result<String, DomainError> {
        let mut url = parse_base(base)?;
        url.query_pairs_mut()
            .append_pair("order_id", &intent.id.to_string())
            .append_pair("amount", &intent.amount.to_string())
            .append_pair("redirect_url", return_url);
        Ok(url.into())
    }
}

impl CheckoutBuilder for MerchantLinks {
    fn checkout_url(
        &self,
        intent: &PaymentIntent,
        return_url: &str,
    ) -> Result<String, DomainError> {
        match intent.provider {
            PaymentProvider::Payme => self.payme_url(intent),
            PaymentProvider::Click => self.click_url(intent, return_url),
            PaymentProvider::Uzum => {
                self.generic_url(&self.config.uzum_checkout_url, intent, return_url)
            }
            PaymentProvider::Paynet => {
                self.generic_url(&self.config.paynet_checkout_url, intent, return_url)
            }
        }
    }

    fn qr_payment_url(&self, qr_token: &str) -> String {
        format!(
            "{}/qr/{}",
            self.config.public_base_url.trim_end_matches('/'),
            qr_token
        )
    }

    fn qr_image_url(&self, payment_url: &str) -> String {
        match parse_base(&self.config.qr_render_url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("size", "300x300")
                    .append_pair("data", payment_url);
                url.into()
            }
            // Config validation guarantees a parseable URL; keep a harmless
            // value on the unreachable branch.
            Err(_) => String::new(),
        }
    }
}

fn parse_base(base: &str) -> Result<Url, DomainError> {
    Url::parse(base).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid checkout base URL: {}", e),
        )
    })
}
