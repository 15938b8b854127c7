//! Provider callback shapes and canonical event extraction.
//!
//! Each supported network delivers webhooks in its own shape. This module
//! holds the closed set of typed callback bodies and reduces every one of
//! them to a [`CanonicalEvent`]: who the callback is about, the provider's
//! transaction id, and the resolved payment outcome. The state-machine
//! transition logic downstream never sees a provider-specific field.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payments::PaymentProvider;

/// Outcome a callback resolves to, provider-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResolution {
    /// Acknowledge only; the intent stays in flight.
    Processing,
    Completed,
    Failed,
}

/// How the callback identifies the payment intent it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// The correlation token is the intent id itself.
    Payment(PaymentId),
    /// The intent must be looked up by a previously attached provider
    /// transaction id (Payme perform/cancel steps).
    ProviderTxn(String),
}

/// The canonical form every provider callback normalizes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEvent {
    pub correlation: Correlation,
    pub provider_txn_id: String,
    pub resolution: WebhookResolution,
}

/// Failures while extracting the canonical fields from a callback body.
#[derive(Debug, Clone, Error)]
pub enum CallbackError {
    #[error("Callback is missing its payment correlation id")]
    MissingCorrelation,

    #[error("Callback correlation id is not a valid payment id: {0}")]
    InvalidCorrelation(String),

    #[error("Callback is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Unsupported method '{0}'")]
    UnsupportedMethod(String),

    #[error("Callback body does not match the provider's shape: {0}")]
    Malformed(String),
}

impl From<CallbackError> for DomainError {
    fn from(err: CallbackError) -> Self {
        DomainError::new(ErrorCode::MalformedWebhook, err.to_string())
    }
}

fn parse_payment_id(raw: &str) -> Result<PaymentId, CallbackError> {
    raw.parse()
        .map_err(|_| CallbackError::InvalidCorrelation(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Payme (JSON-RPC 2.0, three-step handshake)
// ---------------------------------------------------------------------------

/// Payme merchant-API methods this core handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymeMethod {
    CheckPerform,
    Create,
    Perform,
    Cancel,
    Unknown(String),
}

/// A Payme JSON-RPC request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymeRequest {
    /// JSON-RPC request id, echoed back in the reply.
    #[serde(default)]
    pub id: Option<i64>,
    pub method: String,
    #[serde(default)]
    pub params: PaymeParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymeParams {
    /// Payme's own transaction id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account: Option<PaymeAccount>,
    /// Amount in tiyin.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub reason: Option<i32>,
}

/// The account object echoed back from the checkout URL parameters.
/// The `booking_id` field carries the payment intent id as Payme's
/// correlation token.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymeAccount {
    #[serde(default)]
    pub booking_id: Option<String>,
}

/// What a Payme request asks this core to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymeAction {
    /// `CheckPerformTransaction`: answer allow/deny synchronously, with no
    /// state mutation whatsoever.
    Preflight { payment_id: PaymentId },
    /// A state-affecting step, reduced to its canonical event.
    Event(CanonicalEvent),
}

impl PaymeRequest {
    pub fn method(&self) -> PaymeMethod {
        match self.method.as_str() {
            "CheckPerformTransaction" => PaymeMethod::CheckPerform,
            "CreateTransaction" => PaymeMethod::Create,
            "PerformTransaction" => PaymeMethod::Perform,
            "CancelTransaction" => PaymeMethod::Cancel,
            other => PaymeMethod::Unknown(other.to_string()),
        }
    }

    fn account_payment_id(&self) -> Result<PaymentId, CallbackError> {
        let raw = self
            .params
            .account
            .as_ref()
            .and_then(|a| a.booking_id.as_deref())
            .ok_or(CallbackError::MissingCorrelation)?;
        parse_payment_id(raw)
    }

    fn transaction_id(&self) -> Result<String, CallbackError> {
        self.params
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(CallbackError::MissingField("params.id"))
    }

    /// Reduces the request to the action the webhook pipeline must take.
    pub fn extract(&self) -> Result<PaymeAction, CallbackError> {
        match self.method() {
            PaymeMethod::CheckPerform => Ok(PaymeAction::Preflight {
                payment_id: self.account_payment_id()?,
            }),
            PaymeMethod::Create => Ok(PaymeAction::Event(CanonicalEvent {
                correlation: Correlation::Payment(self.account_payment_id()?),
                provider_txn_id: self.transaction_id()?,
                resolution: WebhookResolution::Processing,
            })),
            PaymeMethod::Perform => {
                let txn = self.transaction_id()?;
                Ok(PaymeAction::Event(CanonicalEvent {
                    correlation: Correlation::ProviderTxn(txn.clone()),
                    provider_txn_id: txn,
                    resolution: WebhookResolution::Completed,
                }))
            }
            PaymeMethod::Cancel => {
                let txn = self.transaction_id()?;
                Ok(PaymeAction::Event(CanonicalEvent {
                    correlation: Correlation::ProviderTxn(txn.clone()),
                    provider_txn_id: txn,
                    resolution: WebhookResolution::Failed,
                }))
            }
            PaymeMethod::Unknown(m) => Err(CallbackError::UnsupportedMethod(m)),
        }
    }
}

// ---------------------------------------------------------------------------
// Click (prepare/complete form fields)
// ---------------------------------------------------------------------------

/// A Click callback body.
///
/// `action` 0 is the prepare step, 1 the complete step; a non-zero `error`
/// marks the attempt failed regardless of action.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickCallback {
    #[serde(default)]
    pub click_trans_id: Option<i64>,
    #[serde(default)]
    pub merchant_trans_id: Option<String>,
    #[serde(default)]
    pub error: Option<i32>,
    #[serde(default)]
    pub action: Option<i32>,
    #[serde(default)]
    pub error_note: Option<String>,
}

impl ClickCallback {
    pub fn extract(&self) -> Result<CanonicalEvent, CallbackError> {
        let raw_correlation = self
            .merchant_trans_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CallbackError::MissingCorrelation)?;
        let payment_id = parse_payment_id(raw_correlation)?;
        let txn = self
            .click_trans_id
            .ok_or(CallbackError::MissingField("click_trans_id"))?;

        let error = self.error.unwrap_or(0);
        let action = self.action.unwrap_or(0);
        let resolution = if error != 0 {
            WebhookResolution::Failed
        } else if action == 1 {
            WebhookResolution::Completed
        } else {
            WebhookResolution::Processing
        };

        Ok(CanonicalEvent {
            correlation: Correlation::Payment(payment_id),
            provider_txn_id: txn.to_string(),
            resolution,
        })
    }
}

// ---------------------------------------------------------------------------
// Uzum / Paynet (shared generic shape)
// ---------------------------------------------------------------------------

/// The generic callback shape shared by Uzum and Paynet.
#[derive(Debug, Clone, Deserialize)]
pub struct GenericCallback {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<i32>,
}

impl GenericCallback {
    pub fn extract(&self) -> Result<CanonicalEvent, CallbackError> {
        let raw_correlation = self
            .order_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CallbackError::MissingCorrelation)?;
        let payment_id = parse_payment_id(raw_correlation)?;
        let txn = self
            .transaction_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(CallbackError::MissingField("transaction_id"))?;

        let status = self.status.as_deref();
        let resolution = if status == Some("success") || self.state == Some(2) {
            WebhookResolution::Completed
        } else if status == Some("failed") || self.state == Some(-1) {
            WebhookResolution::Failed
        } else {
            WebhookResolution::Processing
        };

        Ok(CanonicalEvent {
            correlation: Correlation::Payment(payment_id),
            provider_txn_id: txn,
            resolution,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A parsed callback, tagged by the provider it came from.
#[derive(Debug, Clone)]
pub enum ProviderCallback {
    Payme(PaymeRequest),
    Click(ClickCallback),
    Generic(GenericCallback),
}

impl ProviderCallback {
    /// Deserializes a raw JSON body into the shape the named provider uses.
    pub fn parse(
        provider: PaymentProvider,
        body: &serde_json::Value,
    ) -> Result<Self, CallbackError> {
        let parsed = match provider {
            PaymentProvider::Payme => serde_json::from_value(body.clone())
                .map(ProviderCallback::Payme),
            PaymentProvider::Click => serde_json::from_value(body.clone())
                .map(ProviderCallback::Click),
            PaymentProvider::Uzum | PaymentProvider::Paynet => {
                serde_json::from_value(body.clone()).map(ProviderCallback::Generic)
            }
        };
        parsed.map_err(|e| CallbackError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payme(body: serde_json::Value) -> PaymeRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn payme_check_is_a_preflight() {
        let pid = PaymentId::new();
        let req = payme(json!({
            "id": 7,
            "method": "CheckPerformTransaction",
            "params": {"amount": 50_000_000, "account": {"booking_id": pid.to_string()}}
        }));
        match req.extract().unwrap() {
            PaymeAction::Preflight { payment_id } => assert_eq!(payment_id, pid),
            other => panic!("expected preflight, got {:?}", other),
        }
    }

    #[test]
    fn payme_create_correlates_by_account_and_attaches_txn() {
        let pid = PaymentId::new();
        let req = payme(json!({
            "id": 8,
            "method": "CreateTransaction",
            "params": {
                "id": "payme-txn-1",
                "amount": 50_000_000,
                "account": {"booking_id": pid.to_string()}
            }
        }));
        let PaymeAction::Event(event) = req.extract().unwrap() else {
            panic!("expected event")
        };
        assert_eq!(event.correlation, Correlation::Payment(pid));
        assert_eq!(event.provider_txn_id, "payme-txn-1");
        assert_eq!(event.resolution, WebhookResolution::Processing);
    }

    #[test]
    fn payme_perform_correlates_by_transaction_id() {
        let req = payme(json!({
            "id": 9,
            "method": "PerformTransaction",
            "params": {"id": "payme-txn-1"}
        }));
        let PaymeAction::Event(event) = req.extract().unwrap() else {
            panic!("expected event")
        };
        assert_eq!(
            event.correlation,
            Correlation::ProviderTxn("payme-txn-1".to_string())
        );
        assert_eq!(event.resolution, WebhookResolution::Completed);
    }

    #[test]
    fn payme_cancel_resolves_failed() {
        let req = payme(json!({
            "method": "CancelTransaction",
            "params": {"id": "payme-txn-1", "reason": 5}
        }));
        let PaymeAction::Event(event) = req.extract().unwrap() else {
            panic!("expected event")
        };
        assert_eq!(event.resolution, WebhookResolution::Failed);
    }

    #[test]
    fn payme_without_account_fails_fast() {
        let req = payme(json!({"method": "CreateTransaction", "params": {"id": "t"}}));
        assert!(matches!(
            req.extract(),
            Err(CallbackError::MissingCorrelation)
        ));
    }

    #[test]
    fn payme_unknown_method_is_rejected() {
        let req = payme(json!({"method": "GetStatement", "params": {}}));
        assert!(matches!(
            req.extract(),
            Err(CallbackError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn click_success_predicate_requires_error_zero_and_action_one() {
        let pid = PaymentId::new();
        let cb: ClickCallback = serde_json::from_value(json!({
            "click_trans_id": 1234,
            "merchant_trans_id": pid.to_string(),
            "error": 0,
            "action": 1
        }))
        .unwrap();
        let event = cb.extract().unwrap();
        assert_eq!(event.correlation, Correlation::Payment(pid));
        assert_eq!(event.provider_txn_id, "1234");
        assert_eq!(event.resolution, WebhookResolution::Completed);
    }

    #[test]
    fn click_prepare_step_only_acknowledges() {
        let cb: ClickCallback = serde_json::from_value(json!({
            "click_trans_id": 1234,
            "merchant_trans_id": PaymentId::new().to_string(),
            "error": 0,
            "action": 0
        }))
        .unwrap();
        assert_eq!(cb.extract().unwrap().resolution, WebhookResolution::Processing);
    }

    #[test]
    fn click_nonzero_error_resolves_failed_even_on_complete_action() {
        let cb: ClickCallback = serde_json::from_value(json!({
            "click_trans_id": 1234,
            "merchant_trans_id": PaymentId::new().to_string(),
            "error": -5017,
            "action": 1
        }))
        .unwrap();
        assert_eq!(cb.extract().unwrap().resolution, WebhookResolution::Failed);
    }

    #[test]
    fn click_without_merchant_trans_id_fails_fast() {
        let cb: ClickCallback =
            serde_json::from_value(json!({"click_trans_id": 1, "error": 0, "action": 1})).unwrap();
        assert!(matches!(cb.extract(), Err(CallbackError::MissingCorrelation)));
    }

    #[test]
    fn click_with_garbage_correlation_is_invalid() {
        let cb: ClickCallback = serde_json::from_value(json!({
            "click_trans_id": 1,
            "merchant_trans_id": "not-a-payment-id",
            "error": 0,
            "action": 1
        }))
        .unwrap();
        assert!(matches!(cb.extract(), Err(CallbackError::InvalidCorrelation(_))));
    }

    #[test]
    fn generic_completes_on_status_success_or_state_two() {
        let pid = PaymentId::new();
        for body in [
            json!({"order_id": pid.to_string(), "transaction_id": "T1", "status": "success"}),
            json!({"order_id": pid.to_string(), "transaction_id": "T1", "state": 2}),
        ] {
            let cb: GenericCallback = serde_json::from_value(body).unwrap();
            assert_eq!(cb.extract().unwrap().resolution, WebhookResolution::Completed);
        }
    }

    #[test]
    fn generic_fails_on_failed_status_or_negative_state() {
        let pid = PaymentId::new();
        for body in [
            json!({"order_id": pid.to_string(), "transaction_id": "T1", "status": "failed"}),
            json!({"order_id": pid.to_string(), "transaction_id": "T1", "state": -1}),
        ] {
            let cb: GenericCallback = serde_json::from_value(body).unwrap();
            assert_eq!(cb.extract().unwrap().resolution, WebhookResolution::Failed);
        }
    }

    #[test]
    fn generic_without_order_id_fails_fast() {
        let cb: GenericCallback =
            serde_json::from_value(json!({"transaction_id": "T1", "status": "success"})).unwrap();
        assert!(matches!(cb.extract(), Err(CallbackError::MissingCorrelation)));
    }

    #[test]
    fn parse_selects_shape_by_provider() {
        let pid = PaymentId::new().to_string();
        let payme_body = json!({"method": "PerformTransaction", "params": {"id": "t"}});
        assert!(matches!(
            ProviderCallback::parse(PaymentProvider::Payme, &payme_body).unwrap(),
            ProviderCallback::Payme(_)
        ));
        let generic_body = json!({"order_id": pid, "transaction_id": "T1", "state": 2});
        assert!(matches!(
            ProviderCallback::parse(PaymentProvider::Uzum, &generic_body).unwrap(),
            ProviderCallback::Generic(_)
        ));
        assert!(matches!(
            ProviderCallback::parse(PaymentProvider::Paynet, &generic_body).unwrap(),
            ProviderCallback::Generic(_)
        ));
    }
}
