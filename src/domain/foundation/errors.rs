//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
///
/// Codes are stable identifiers surfaced to API clients; the accompanying
/// message may carry detail, but handlers map detail to logs, not responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyRecord,
    UnknownColumn,

    // Not found errors
    UnknownCollection,
    RecordNotFound,
    BookingNotFound,
    PaymentNotFound,

    // Authorization errors
    Unauthorized,
    Forbidden,
    NotAVendor,

    // Webhook errors
    MalformedWebhook,
    InvalidStateTransition,

    // Infrastructure errors
    DatabaseError,
    UpstreamUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Stable string form used in API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyRecord => "EMPTY_RECORD",
            ErrorCode::UnknownColumn => "UNKNOWN_COLUMN",
            ErrorCode::UnknownCollection => "UNKNOWN_COLLECTION",
            ErrorCode::RecordNotFound => "RECORD_NOT_FOUND",
            ErrorCode::BookingNotFound => "BOOKING_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotAVendor => "NOT_A_VENDOR",
            ErrorCode::MalformedWebhook => "MALFORMED_WEBHOOK",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    /// Creates a database error wrapping the underlying message.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// True when the error should surface as a client (4xx) failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self.code,
            ErrorCode::DatabaseError | ErrorCode::UpstreamUnavailable | ErrorCode::InternalError
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
