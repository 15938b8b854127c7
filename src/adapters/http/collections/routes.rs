//! HTTP routes for collection gateway endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::adapters::http::AppState;

use super::handlers::{create_record, list_collection, update_collection, update_record};

/// Creates the collection gateway router. Update accepts the target id as
/// `?id=`, in the body, or as a trailing path segment.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/:name", get(list_collection))
        .route("/:name", post(create_record))
        .route("/:name", patch(update_collection))
        .route("/:name/:id", patch(update_record))
}
