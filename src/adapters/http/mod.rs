//! HTTP adapters - REST API surface.

pub mod collections;
pub mod error;
pub mod middleware;
pub mod payments;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::application::{CollectionService, PaymentService, WebhookService};
use crate::ports::RateProvider;

use middleware::{auth_middleware, AuthState};

/// Shared state for the whole REST surface.
#[derive(Clone)]
pub struct AppState {
    pub collections: CollectionService,
    pub payments: PaymentService,
    pub webhooks: WebhookService,
    pub rates: Arc<dyn RateProvider>,
}

/// Assembles the full API router. The auth middleware runs on every route;
/// it injects the caller when a valid token is present and leaves public
/// reads untouched otherwise.
pub fn api_router(state: AppState, validator: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/collections", collections::collection_routes())
        .route("/api/vendors", get(collections::list_vendors))
        .nest("/api/payments", payments::payment_routes())
        .route("/api/webhooks/payments", post(payments::payment_webhook))
        .route("/api/rates", get(current_rate))
        .layer(axum::middleware::from_fn_with_state(
            validator,
            auth_middleware,
        ))
        .with_state(state)
}

/// GET /health - liveness probe
async fn health() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

/// GET /api/rates - current UZS/USD rate from the cached feed
async fn current_rate(State(state): State<AppState>) -> Response {
    let snapshot = state.rates.snapshot().await;
    (
        StatusCode::OK,
        Json(json!({
            "currency": "UZS",
            "usd_rate": snapshot.usd_rate,
            "stale": snapshot.stale,
        })),
    )
        .into_response()
}
