//! HTTP adapter for payment issuance and provider webhooks.

mod dto;
mod handlers;
mod routes;

pub use handlers::payment_webhook;
pub use routes::payment_routes;
