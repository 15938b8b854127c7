//! PostgreSQL adapters - database implementations of the persistence ports.

mod booking_store;
mod collection_store;
mod payment_repository;
mod qr_session_repository;
mod vendor_directory;

pub use booking_store::PostgresBookingStore;
pub use collection_store::PostgresCollectionStore;
pub use payment_repository::PostgresPaymentIntentRepository;
pub use qr_session_repository::PostgresQrSessionRepository;
pub use vendor_directory::PostgresVendorDirectory;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Maps a sqlx error to the shared database error code.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}
