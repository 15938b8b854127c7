//! JWT implementation of SessionValidator.
//!
//! Validates HS256 access tokens minted by the platform's auth service with
//! a shared secret. Identity comes entirely from the verified claims; no
//! network round-trip is involved.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, UserRole};
use crate::ports::SessionValidator;

/// Claims carried in a platform access token.
#[derive(Debug, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    email: String,
    /// Role claim; absent means couple.
    role: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// Validates bearer tokens against the shared HS256 secret.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let id: UserId = data.claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let role = data
            .claims
            .role
            .as_deref()
            .map(UserRole::from_claim)
            .unwrap_or(UserRole::Couple);

        Ok(AuthenticatedUser::new(id, data.claims.email, role))
    }
}
