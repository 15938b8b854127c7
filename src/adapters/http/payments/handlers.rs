//! HTTP handlers for payment issuance and provider webhooks.
//!
//! Webhook replies are provider-shaped: Payme gets JSON-RPC envelopes with
//! its own error codes (always HTTP 200), Click gets its id-echoing ack,
//! and the generic providers get a plain JSON acknowledgment. Duplicate
//! deliveries against settled payments are acknowledged as no-ops.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::adapters::http::error::{domain_error_response, ErrorResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::{
    CreatePaymentCommand, CreateQrSessionCommand, PreflightDecision, WebhookAck,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::payments::{
    CanonicalEvent, ClickCallback, GenericCallback, PaymeAction, PaymeRequest, PaymentProvider,
    PaymentStatus, ProviderCallback, WebhookResolution,
};
use crate::ports::TransitionOutcome;

use super::dto::{
    CreatePaymentRequest, CreatePaymentResponse, CreateQrSessionRequest, QrSessionResponse,
    WebhookParams,
};

// ════════════════════════════════════════════════════════════════════════════
// Issuer endpoints
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - create a payment intent with a checkout URL
pub async fn create_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreatePaymentRequest>,
) -> Response {
    let provider: PaymentProvider = match req.provider.parse() {
        Ok(p) => p,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Unknown payment provider: {}",
                    req.provider
                ))),
            )
                .into_response()
        }
    };

    let cmd = CreatePaymentCommand {
        booking_id: req.booking_id,
        amount: req.amount,
        provider,
        return_url: req.return_url,
    };

    match state.payments.create_payment(cmd, &user).await {
        Ok(issued) => {
            let response: CreatePaymentResponse = issued.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/payments/qr-sessions - create a vendor QR payment session
pub async fn create_qr_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateQrSessionRequest>,
) -> Response {
    let cmd = CreateQrSessionCommand {
        booking_id: req.booking_id,
        amount: req.amount,
        description: req.description,
        expires_in_minutes: req.expires_in_minutes,
    };

    match state.payments.create_qr_session(cmd, &user).await {
        Ok(issued) => {
            let response: QrSessionResponse = issued.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Webhook dispatch
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/payments?provider=... - provider callback intake
pub async fn payment_webhook(
    State(state): State<AppState>,
    Query(params): Query<WebhookParams>,
    Json(body): Json<Value>,
) -> Response {
    let provider: PaymentProvider = match params.provider.parse() {
        Ok(p) => p,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Unknown payment provider: {}",
                    params.provider
                ))),
            )
                .into_response()
        }
    };

    let callback = match ProviderCallback::parse(provider, &body) {
        Ok(callback) => callback,
        // Payme must see a JSON-RPC error even for unparseable bodies.
        Err(e) if provider == PaymentProvider::Payme => {
            return payme_error(body.get("id").cloned(), PAYME_INVALID_REQUEST, &e.to_string())
        }
        Err(e) => return domain_error_response(e.into()),
    };

    match callback {
        ProviderCallback::Payme(request) => payme_webhook(state, request).await,
        ProviderCallback::Click(callback) => click_webhook(state, callback).await,
        ProviderCallback::Generic(callback) => generic_webhook(state, provider, callback).await,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Payme (JSON-RPC)
// ════════════════════════════════════════════════════════════════════════════

const PAYME_ACCOUNT_NOT_FOUND: i64 = -31050;
const PAYME_UNABLE_TO_PERFORM: i64 = -31008;
const PAYME_INVALID_REQUEST: i64 = -32600;

async fn payme_webhook(state: AppState, request: PaymeRequest) -> Response {
    let rpc_id = request.id.map(|id| json!(id));

    let action = match request.extract() {
        Ok(action) => action,
        Err(e) => return payme_error(rpc_id, PAYME_INVALID_REQUEST, &e.to_string()),
    };

    match action {
        PaymeAction::Preflight { payment_id } => {
            match state.webhooks.preflight(payment_id).await {
                Ok(PreflightDecision::Allow) => {
                    payme_result(rpc_id, json!({"allow": true}))
                }
                Ok(PreflightDecision::UnknownAccount) => payme_error(
                    rpc_id,
                    PAYME_ACCOUNT_NOT_FOUND,
                    "Payment not found for this account",
                ),
                Ok(PreflightDecision::UnableToPerform) => payme_error(
                    rpc_id,
                    PAYME_UNABLE_TO_PERFORM,
                    "Payment is already settled",
                ),
                Err(e) => payme_error(rpc_id, PAYME_UNABLE_TO_PERFORM, &e.message),
            }
        }
        PaymeAction::Event(event) => {
            match state.webhooks.apply(PaymentProvider::Payme, event).await {
                Ok(ack) => payme_event_result(rpc_id, &ack),
                Err(e) if e.code == ErrorCode::PaymentNotFound => payme_error(
                    rpc_id,
                    PAYME_ACCOUNT_NOT_FOUND,
                    "Payment not found for this account",
                ),
                Err(e) => payme_error(rpc_id, PAYME_UNABLE_TO_PERFORM, &e.message),
            }
        }
    }
}

/// Builds the method-specific success result, treating a duplicate delivery
/// against an identically-settled payment as the same success.
fn payme_event_result(rpc_id: Option<Value>, ack: &WebhookAck) -> Response {
    let duplicate_of_same_outcome = ack.outcome == TransitionOutcome::AlreadyTerminal
        && ack.intent.status == ack.target;
    if ack.outcome != TransitionOutcome::Applied && !duplicate_of_same_outcome {
        return payme_error(rpc_id, PAYME_UNABLE_TO_PERFORM, "Payment is already settled");
    }

    let now_ms = Utc::now().timestamp_millis();
    let transaction = ack.intent.id.to_string();
    let result = match ack.target {
        PaymentStatus::Processing => {
            json!({"create_time": now_ms, "transaction": transaction, "state": 1})
        }
        PaymentStatus::Completed => {
            json!({"perform_time": now_ms, "transaction": transaction, "state": 2})
        }
        PaymentStatus::Failed => {
            json!({"cancel_time": now_ms, "transaction": transaction, "state": -2})
        }
        PaymentStatus::Pending => {
            return payme_error(rpc_id, PAYME_UNABLE_TO_PERFORM, "Payment is not payable")
        }
    };
    payme_result(rpc_id, result)
}

fn payme_result(rpc_id: Option<Value>, result: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({"id": rpc_id, "result": result})),
    )
        .into_response()
}

fn payme_error(rpc_id: Option<Value>, code: i64, message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({"id": rpc_id, "error": {"code": code, "message": message}})),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Click
// ════════════════════════════════════════════════════════════════════════════

async fn click_webhook(state: AppState, callback: ClickCallback) -> Response {
    let event = match callback.extract() {
        Ok(event) => event,
        Err(e) => return domain_error_response(e.into()),
    };

    match state.webhooks.apply(PaymentProvider::Click, event).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "click_trans_id": callback.click_trans_id,
                "merchant_trans_id": callback.merchant_trans_id,
                "error": 0,
                "error_note": "Success"
            })),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Uzum / Paynet
// ════════════════════════════════════════════════════════════════════════════

async fn generic_webhook(
    state: AppState,
    provider: PaymentProvider,
    callback: GenericCallback,
) -> Response {
    let event: CanonicalEvent = match callback.extract() {
        Ok(event) => event,
        Err(e) => return domain_error_response(e.into()),
    };

    // Processing-only callbacks from these providers are acknowledged
    // without a transition attempt.
    if event.resolution == WebhookResolution::Processing {
        return (StatusCode::OK, Json(json!({"ok": true}))).into_response();
    }

    match state.webhooks.apply(provider, event).await {
        Ok(ack) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "payment_id": ack.intent.id.to_string(),
                "status": ack.target.as_str()
            })),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}
