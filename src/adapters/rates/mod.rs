//! Exchange-rate adapters: the upstream HTTP feed and its read-through cache.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::RatesConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{RateFeed, RateProvider, RateSnapshot};

// ════════════════════════════════════════════════════════════════════════════
// Upstream HTTP feed
// ════════════════════════════════════════════════════════════════════════════

/// One entry in the central bank's published rate list.
#[derive(Debug, Deserialize)]
struct FeedEntry {
    #[serde(rename = "Ccy")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: String,
}

/// Fetches the UZS/USD rate from the configured feed URL.
pub struct HttpRateFeed {
    client: reqwest::Client,
    feed_url: String,
}

impl HttpRateFeed {
    pub fn new(feed_url: String, request_timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build rate feed client: {}", e),
                )
            })?;
        Ok(Self { client, feed_url })
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    async fn usd_rate(&self) -> Result<f64, DomainError> {
        let entries: Vec<FeedEntry> = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| upstream_error("Rate feed request failed", e))?
            .error_for_status()
            .map_err(|e| upstream_error("Rate feed returned an error status", e))?
            .json()
            .await
            .map_err(|e| upstream_error("Rate feed returned malformed JSON", e))?;

        entries
            .iter()
            .find(|e| e.currency == "USD")
            .and_then(|e| e.rate.parse::<f64>().ok())
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UpstreamUnavailable,
                    "Rate feed response carried no usable USD rate",
                )
            })
    }
}

fn upstream_error(context: &str, e: reqwest::Error) -> DomainError {
    DomainError::new(ErrorCode::UpstreamUnavailable, format!("{}: {}", context, e))
}

// ════════════════════════════════════════════════════════════════════════════
// Read-through cache
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    usd_rate: f64,
    fetched_at: DateTime<Utc>,
}

/// Caching [`RateProvider`] over a [`RateFeed`].
///
/// A snapshot within the refresh interval is served as fresh. When a refresh
/// fails, the last known value is served stale; before any fetch has
/// succeeded the configured fallback rate is used.
pub struct CachedRateFeed {
    feed: Box<dyn RateFeed>,
    refresh_interval: chrono::Duration,
    fallback_rate: f64,
    cache: RwLock<Option<CacheEntry>>,
}

impl CachedRateFeed {
    pub fn new(feed: Box<dyn RateFeed>, config: &RatesConfig) -> Self {
        Self {
            feed,
            refresh_interval: chrono::Duration::seconds(config.refresh_interval_secs as i64),
            fallback_rate: config.fallback_uzs_per_usd,
            cache: RwLock::new(None),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.refresh_interval
    }
}

#[async_trait]
impl RateProvider for CachedRateFeed {
    async fn snapshot(&self) -> RateSnapshot {
        let now = Utc::now();

        if let Some(entry) = *self.cache.read().await {
            if self.is_fresh(&entry, now) {
                return RateSnapshot {
                    usd_rate: entry.usd_rate,
                    stale: false,
                };
            }
        }

        match self.feed.usd_rate().await {
            Ok(rate) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CacheEntry {
                    usd_rate: rate,
                    fetched_at: now,
                });
                RateSnapshot {
                    usd_rate: rate,
                    stale: false,
                }
            }
            Err(e) => {
                tracing::warn!("Rate feed refresh failed, serving cached value: {}", e);
                match *self.cache.read().await {
                    Some(entry) => RateSnapshot {
                        usd_rate: entry.usd_rate,
                        stale: true,
                    },
                    None => RateSnapshot {
                        usd_rate: self.fallback_rate,
                        stale: true,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedFeed {
        results: Vec<Result<f64, ()>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RateFeed for ScriptedFeed {
        async fn usd_rate(&self) -> Result<f64, DomainError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.results.get(call).copied().unwrap_or(Err(())) {
                Ok(rate) => Ok(rate),
                Err(()) => Err(DomainError::new(
                    ErrorCode::UpstreamUnavailable,
                    "feed down",
                )),
            }
        }
    }

    fn cached(results: Vec<Result<f64, ()>>) -> (CachedRateFeed, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = ScriptedFeed {
            results,
            calls: calls.clone(),
        };
        let config = RatesConfig::default();
        (CachedRateFeed::new(Box::new(feed), &config), calls)
    }

    #[tokio::test]
    async fn fresh_value_is_cached_across_calls() {
        let (cache, calls) = cached(vec![Ok(12_650.0)]);

        let first = cache.snapshot().await;
        assert_eq!(first.usd_rate, 12_650.0);
        assert!(!first.stale);

        let second = cache.snapshot().await;
        assert_eq!(second.usd_rate, 12_650.0);
        assert!(!second.stale);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_serves_before_first_successful_fetch() {
        let (cache, _) = cached(vec![Err(())]);

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.usd_rate, RatesConfig::default().fallback_uzs_per_usd);
        assert!(snapshot.stale);
    }

    #[tokio::test]
    async fn feed_entry_parses_cbu_shape() {
        let json = r#"[{"Ccy":"USD","Rate":"12650.14"},{"Ccy":"EUR","Rate":"13700.00"}]"#;
        let entries: Vec<FeedEntry> = serde_json::from_str(json).unwrap();
        let usd = entries.iter().find(|e| e.currency == "USD").unwrap();
        assert_eq!(usd.rate.parse::<f64>().unwrap(), 12650.14);
    }
}
