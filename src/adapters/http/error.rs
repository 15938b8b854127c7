//! HTTP error mapping shared by all REST handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Standard JSON error body: stable code plus a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

/// Maps a domain error to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyRecord
        | ErrorCode::UnknownColumn
        | ErrorCode::MalformedWebhook
        | ErrorCode::InvalidStateTransition => StatusCode::BAD_REQUEST,

        ErrorCode::UnknownCollection
        | ErrorCode::RecordNotFound
        | ErrorCode::BookingNotFound
        | ErrorCode::PaymentNotFound => StatusCode::NOT_FOUND,

        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden | ErrorCode::NotAVendor => StatusCode::FORBIDDEN,

        ErrorCode::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a domain error as a JSON response. Server-side failures are
/// logged in full and surfaced with a generic message.
pub fn domain_error_response(error: DomainError) -> Response {
    let status = status_for(error.code);
    let body = if error.is_client_error() {
        ErrorResponse::new(error.code.as_str(), error.message)
    } else {
        tracing::error!(code = %error.code, "request failed: {}", error.message);
        ErrorResponse::new(error.code.as_str(), "Internal error")
    };
    (status, Json(body)).into_response()
}
