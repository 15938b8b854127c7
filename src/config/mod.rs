//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `WEDPLAN` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use wedplan::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod payment;
mod rates;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use rates::RatesConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Authentication configuration (JWT signing secret)
    pub auth: AuthConfig,

    /// Payment provider merchant identifiers
    pub payment: PaymentConfig,

    /// Exchange-rate feed configuration
    #[serde(default)]
    pub rates: RatesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `WEDPLAN__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WEDPLAN__DATABASE__URL=...` -> `database.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WEDPLAN")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.rates.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("WEDPLAN__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("WEDPLAN__AUTH__JWT_SECRET", "test-secret");
        env::set_var("WEDPLAN__PAYMENT__PAYME_MERCHANT_ID", "merchant-1");
        env::set_var("WEDPLAN__PAYMENT__CLICK_SERVICE_ID", "svc-1");
        env::set_var("WEDPLAN__PAYMENT__CLICK_MERCHANT_ID", "m-1");
    }

    fn clear_env() {
        env::remove_var("WEDPLAN__DATABASE__URL");
        env::remove_var("WEDPLAN__AUTH__JWT_SECRET");
        env::remove_var("WEDPLAN__PAYMENT__PAYME_MERCHANT_ID");
        env::remove_var("WEDPLAN__PAYMENT__CLICK_SERVICE_ID");
        env::remove_var("WEDPLAN__PAYMENT__CLICK_MERCHANT_ID");
        env::remove_var("WEDPLAN__SERVER__PORT");
        env::remove_var("WEDPLAN__SERVER__ENVIRONMENT");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.payme_merchant_id, "merchant-1");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.rates.refresh_interval_secs, 3600);
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("WEDPLAN__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }
}
