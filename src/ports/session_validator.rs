//! Port for validating bearer tokens into authenticated users.

use async_trait::async_trait;

use crate::domain::foundation::{AuthenticatedUser, AuthError};

/// Validates an access token and resolves the caller's identity.
///
/// Implementations must be pure verification: no persistence, no
/// side effects beyond clock reads.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validates the token (already stripped of the `Bearer` scheme).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
