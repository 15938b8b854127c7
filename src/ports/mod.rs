//! Ports: the async trait seams between the application core and its
//! adapters.

mod checkout;
mod collection_store;
mod payments;
mod rate_feed;
mod session_validator;

pub use checkout::CheckoutBuilder;
pub use collection_store::CollectionStore;
pub use payments::{
    BookingStore, BookingSummary, PaymentIntentRepository, QrSessionRepository,
    TransitionOutcome, VendorDirectory,
};
pub use rate_feed::{RateFeed, RateProvider, RateSnapshot};
pub use session_validator::SessionValidator;
