//! Foundation types shared across the domain: identifiers, authentication,
//! and the error taxonomy.

mod auth;
mod errors;
mod ids;

pub use auth::{AuthError, AuthenticatedUser, UserRole};
pub use errors::{DomainError, ErrorCode};
pub use ids::{BookingId, PaymentId, QrSessionId, UserId, VendorId};
