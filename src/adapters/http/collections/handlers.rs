//! HTTP handlers for collection gateway endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::http::error::{domain_error_response, ErrorResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::domain::collections::Record;
use crate::domain::foundation::AuthenticatedUser;

use super::dto::{ListParams, UpdateParams};

/// GET /api/collections/:name - list records (public)
pub async fn list_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    match state.collections.list(&name, params.into()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// GET /api/vendors - vendor catalog alias (public)
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    match state.collections.list_vendors(params.into()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/collections/:name - create a record
pub async fn create_record(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let record = match as_record(body) {
        Ok(record) => record,
        Err(response) => return response,
    };

    match state.collections.create(&name, record, &user).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// PATCH /api/collections/:name?id= - update a record the caller owns.
/// The target id comes from the `id` query parameter or, failing that,
/// the body's `id` key; either way it never joins the assignment set.
pub async fn update_collection(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(name): Path<String>,
    Query(params): Query<UpdateParams>,
    Json(body): Json<Value>,
) -> Response {
    let changes = match as_record(body) {
        Ok(changes) => changes,
        Err(response) => return response,
    };
    let raw_id = params
        .id
        .as_deref()
        .or_else(|| changes.get("id").and_then(Value::as_str));
    let id = match raw_id {
        Some(raw) => match parse_record_id(raw) {
            Ok(id) => id,
            Err(response) => return response,
        },
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(
                    "Update requires a record id in the query or body",
                )),
            )
                .into_response()
        }
    };

    apply_update(state, user, name, id, changes).await
}

/// PATCH /api/collections/:name/:id - path-segment form of Update
pub async fn update_record(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((name, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let id = match parse_record_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changes = match as_record(body) {
        Ok(changes) => changes,
        Err(response) => return response,
    };

    apply_update(state, user, name, id, changes).await
}

async fn apply_update(
    state: AppState,
    user: AuthenticatedUser,
    name: String,
    id: Uuid,
    changes: Record,
) -> Response {
    match state.collections.update(&name, id, changes, &user).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

fn parse_record_id(raw: &str) -> Result<Uuid, Response> {
    raw.parse::<Uuid>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid record id")),
        )
            .into_response()
    })
}

fn as_record(body: Value) -> Result<Record, Response> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Request body must be a JSON object")),
        )
            .into_response()),
    }
}
