//! Ports for the exchange-rate feed and its read-through cache.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Upstream currency feed: UZS per one USD.
#[async_trait]
pub trait RateFeed: Send + Sync {
    async fn usd_rate(&self) -> Result<f64, DomainError>;
}

/// A cached rate observation as served to consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSnapshot {
    pub usd_rate: f64,
    /// True when the value did not come from a fresh upstream fetch
    /// (stale cache entry or the configured fallback).
    pub stale: bool,
}

/// Read-through view over the feed. Never fails: a broken upstream serves
/// the last known value, or the configured fallback before any fetch
/// succeeded.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn snapshot(&self) -> RateSnapshot;
}
