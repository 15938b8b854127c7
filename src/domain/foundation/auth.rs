//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a JWT token.
//! They have no provider dependencies - the `SessionValidator` port populates
//! them regardless of how the token was minted.

use super::UserId;
use thiserror::Error;

/// Role claim carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Couple,
    Vendor,
    Admin,
}

impl UserRole {
    /// Parses the role claim; unknown values fall back to `Couple`,
    /// the least-privileged role.
    pub fn from_claim(s: &str) -> Self {
        match s {
            "vendor" => UserRole::Vendor,
            "admin" => UserRole::Admin,
            _ => UserRole::Couple,
        }
    }
}

/// Authenticated user extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The unique user identifier (`sub` claim).
    pub id: UserId,

    /// User's email address from the token claims.
    pub email: String,

    /// Role claim, defaulting to `Couple` when absent.
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No token was supplied after stripping the `Bearer` scheme.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token is malformed or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_claims() {
        assert_eq!(UserRole::from_claim("vendor"), UserRole::Vendor);
        assert_eq!(UserRole::from_claim("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_claim("couple"), UserRole::Couple);
    }

    #[test]
    fn role_defaults_to_couple_for_unknown_claims() {
        assert_eq!(UserRole::from_claim("superuser"), UserRole::Couple);
        assert_eq!(UserRole::from_claim(""), UserRole::Couple);
    }

    #[test]
    fn auth_errors_display_without_leaking_detail() {
        assert_eq!(format!("{}", AuthError::MissingToken), "Missing bearer token");
        assert_eq!(format!("{}", AuthError::InvalidToken), "Invalid or expired token");
        assert_eq!(format!("{}", AuthError::TokenExpired), "Token expired");
    }
}
