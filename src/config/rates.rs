//! Exchange-rate feed configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the currency feed and its read-through cache.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Upstream feed URL returning the UZS/USD rate
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// How often the cache refreshes from upstream, in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Timeout for a single upstream request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Rate served before the first successful fetch
    #[serde(default = "default_fallback_rate")]
    pub fallback_uzs_per_usd: f64,
}

impl RatesConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate rates configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if url::Url::parse(&self.feed_url).is_err() {
            return Err(ValidationError::InvalidBaseUrl("rates.feed_url"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        Ok(())
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
            fallback_uzs_per_usd: default_fallback_rate(),
        }
    }
}

fn default_feed_url() -> String {
    "https://cbu.uz/ru/arkhiv-kursov-valyut/json/USD/".to_string()
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fallback_rate() -> f64 {
    12_600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RatesConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let c = RatesConfig {
            refresh_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ValidationError::InvalidRefreshInterval)
        ));
    }

    #[test]
    fn garbage_feed_url_is_rejected() {
        let c = RatesConfig {
            feed_url: "::".to_string(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
