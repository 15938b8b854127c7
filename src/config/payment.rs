//! Payment provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Merchant identifiers and URL bases for the supported payment networks.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Payme merchant id, embedded in checkout parameters
    pub payme_merchant_id: String,

    /// Click service id
    pub click_service_id: String,

    /// Click merchant id
    pub click_merchant_id: String,

    /// Uzum checkout base URL
    #[serde(default = "default_uzum_checkout_url")]
    pub uzum_checkout_url: String,

    /// Paynet checkout base URL
    #[serde(default = "default_paynet_checkout_url")]
    pub paynet_checkout_url: String,

    /// Public base URL of this deployment; QR redemption links hang off it
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// QR rendering endpoint used to derive scannable image URLs
    #[serde(default = "default_qr_render_url")]
    pub qr_render_url: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.payme_merchant_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_PAYME_MERCHANT_ID"));
        }
        if self.click_service_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_CLICK_SERVICE_ID"));
        }
        if self.click_merchant_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_CLICK_MERCHANT_ID"));
        }
        for (url, field) in [
            (&self.uzum_checkout_url, "payment.uzum_checkout_url"),
            (&self.paynet_checkout_url, "payment.paynet_checkout_url"),
            (&self.public_base_url, "payment.public_base_url"),
            (&self.qr_render_url, "payment.qr_render_url"),
        ] {
            if url::Url::parse(url).is_err() {
                return Err(ValidationError::InvalidBaseUrl(field));
            }
        }
        Ok(())
    }
}

fn default_uzum_checkout_url() -> String {
    "https://checkout.uzumbank.uz/pay".to_string()
}

fn default_paynet_checkout_url() -> String {
    "https://checkout.paynet.uz/pay".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_qr_render_url() -> String {
    "https://api.qrserver.com/v1/create-qr-code/".to_string()
}
