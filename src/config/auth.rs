//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::Environment;

/// Authentication configuration (shared JWT signing secret)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the token issuer
    pub jwt_secret: SecretString,
}

impl AuthConfig {
    /// Validate auth configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < 32 {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(config("").validate(&Environment::Development).is_err());
    }

    #[test]
    fn short_secret_is_fine_in_development_only() {
        assert!(config("dev-secret").validate(&Environment::Development).is_ok());
        assert!(matches!(
            config("dev-secret").validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        ));
    }

    #[test]
    fn long_secret_passes_production() {
        let secret = "s".repeat(48);
        assert!(config(&secret).validate(&Environment::Production).is_ok());
    }
}
