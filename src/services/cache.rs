//! TTL memoization of metric results, shared by every render.
//!
//! Unavailable results are cached like values so a failing metric is not
//! re-resolved on every render within its TTL. Concurrent misses on the same
//! metric may both resolve; the last write wins.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::clock::Clock;
use crate::models::{Metric, MetricResult};
use crate::services::chain::MetricResolver;
use crate::telemetry::Telemetry;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: MetricResult,
    expires_at: DateTime<Utc>,
}

/// Lifecycle of one cache slot.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    Empty,
    Fresh(MetricResult),
    /// TTL elapsed; the result is kept for reference until the next fetch.
    Stale(MetricResult),
}

pub struct MetricCache {
    resolver: Arc<dyn MetricResolver>,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<Metric, CacheEntry>>,
    telemetry: Option<Arc<Telemetry>>,
}

impl MetricCache {
    pub fn new(resolver: Arc<dyn MetricResolver>, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver,
            clock,
            entries: RwLock::new(HashMap::new()),
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Return the cached result while fresh, otherwise resolve and store it.
    pub async fn get_or_fetch(&self, metric: &Metric, ttl: Duration) -> MetricResult {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(metric) {
                if now < entry.expires_at {
                    debug!(metric = %metric, "Metric cache hit");
                    self.observe("hit");
                    return entry.result.clone();
                }
            }
        }

        debug!(metric = %metric, "Metric cache miss");
        self.observe("miss");
        let result = self.resolver.resolve(metric).await;
        let expires_at = expiry(self.clock.now(), ttl);

        self.entries.write().await.insert(
            metric.clone(),
            CacheEntry {
                result: result.clone(),
                expires_at,
            },
        );
        result
    }

    /// Drop every entry; the next lookup per metric resolves again.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        info!(dropped = dropped, "Metric cache cleared");
    }

    pub async fn state(&self, metric: &Metric) -> CacheState {
        let now = self.clock.now();
        match self.entries.read().await.get(metric) {
            None => CacheState::Empty,
            Some(entry) if now < entry.expires_at => CacheState::Fresh(entry.result.clone()),
            Some(entry) => CacheState::Stale(entry.result.clone()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn observe(&self, result: &str) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_cache(result);
        }
    }
}

/// `now + ttl`, saturating at the latest representable instant.
fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
