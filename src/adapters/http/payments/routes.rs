//! HTTP routes for payment endpoints.

use axum::{routing::post, Router};

use crate::adapters::http::AppState;

use super::handlers::{create_payment, create_qr_session};

/// Creates the payment issuer router. The webhook endpoint is mounted
/// separately since providers call it outside the `/api/payments` scope.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/qr-sessions", post(create_qr_session))
}
