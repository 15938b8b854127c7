//! The closed set of supported payment providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment networks the platform accepts.
///
/// `Uzum` and `Paynet` share one callback shape; `Payme` speaks JSON-RPC
/// with a three-step handshake; `Click` uses its prepare/complete form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Payme,
    Click,
    Uzum,
    Paynet,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Payme => "payme",
            PaymentProvider::Click => "click",
            PaymentProvider::Uzum => "uzum",
            PaymentProvider::Paynet => "paynet",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payme" => Ok(PaymentProvider::Payme),
            "click" => Ok(PaymentProvider::Click),
            "uzum" => Ok(PaymentProvider::Uzum),
            "paynet" => Ok(PaymentProvider::Paynet),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Error returned when a provider query parameter names no known network.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown payment provider: {0}")]
pub struct UnknownProvider(pub String);
