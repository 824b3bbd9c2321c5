//! One render cycle: resolve every metric through the cache and assemble the
//! panels served by the HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::core::clock::Clock;
use crate::models::{Metric, MetricResult, MetricValue, Signal};
use crate::services::{Diagnostics, FailureRecord, MetricCache};
use crate::signals::{self, SignalInputs};
use crate::watchlist::{self, WatchlistRow};

pub const BTC_FUNDING_SYMBOL: &str = "BTCUSDT";
pub const SOL_FUNDING_SYMBOL: &str = "SOLUSDT";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub ttl: Duration,
    pub price_ttl: Duration,
    pub reference_date: NaiveDate,
    pub history_days: u32,
    pub breadth_top: u32,
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            ttl: config.cache_ttl,
            price_ttl: config.price_cache_ttl,
            reference_date: config.reference_date,
            history_days: config.history_days,
            breadth_top: config.breadth_top,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub btc_price: Option<f64>,
    pub eth_price: Option<f64>,
    pub sol_price: Option<f64>,
    pub reference_date: NaiveDate,
    pub days_since_reference: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub header: Header,
    pub signals: Vec<Signal>,
    pub watchlist: Vec<WatchlistRow>,
    pub diagnostics: Vec<FailureRecord>,
}

pub struct Dashboard {
    cache: Arc<MetricCache>,
    diagnostics: Arc<Diagnostics>,
    clock: Arc<dyn Clock>,
    settings: DashboardSettings,
}

impl Dashboard {
    pub fn new(
        cache: Arc<MetricCache>,
        diagnostics: Arc<Diagnostics>,
        clock: Arc<dyn Clock>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            cache,
            diagnostics,
            clock,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<MetricCache> {
        &self.cache
    }

    /// Metrics are resolved one after another, never concurrently.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let prices = self.spot_prices().await;
        let signals = self.signals().await;

        DashboardSnapshot {
            generated_at: self.clock.now(),
            header: self.header(&prices),
            signals,
            watchlist: watchlist::rows(&prices),
            diagnostics: self.diagnostics.recent(),
        }
    }

    /// "Refresh now": drop every cached metric, then render.
    pub async fn refresh(&self) -> DashboardSnapshot {
        info!("Manual refresh requested");
        self.cache.invalidate_all().await;
        self.snapshot().await
    }

    pub async fn signals(&self) -> Vec<Signal> {
        let inputs = self.signal_inputs().await;
        signals::evaluate(&inputs)
    }

    pub async fn watchlist(&self) -> Vec<WatchlistRow> {
        watchlist::rows(&self.spot_prices().await)
    }

    pub fn diagnostics(&self) -> Vec<FailureRecord> {
        self.diagnostics.recent()
    }

    pub async fn signal_inputs(&self) -> SignalInputs {
        let ttl = self.settings.ttl;
        let days = self.settings.history_days;

        SignalInputs {
            btc_history: self.get(&Metric::price_history("bitcoin", days), ttl).await,
            history_days: days,
            btc_funding: self.get(&Metric::funding_rate(BTC_FUNDING_SYMBOL), ttl).await,
            sol_funding: self.get(&Metric::funding_rate(SOL_FUNDING_SYMBOL), ttl).await,
            lth_sopr: self.get(&Metric::LthSopr, ttl).await,
            mvrv_z: self.get(&Metric::MvrvZScore, ttl).await,
            fear_greed: self.get(&Metric::FearGreed, ttl).await,
            btc_dominance: self.get(&Metric::BtcDominance, ttl).await,
            breadth: self
                .get(
                    &Metric::MarketBreadth {
                        top: self.settings.breadth_top,
                    },
                    ttl,
                )
                .await,
        }
    }

    async fn spot_prices(&self) -> MetricResult {
        let metric = Metric::spot_prices(watchlist::coin_ids());
        self.get(&metric, self.settings.price_ttl).await
    }

    async fn get(&self, metric: &Metric, ttl: Duration) -> MetricResult {
        self.cache.get_or_fetch(metric, ttl).await
    }

    fn header(&self, prices: &MetricResult) -> Header {
        let live = prices.value().and_then(MetricValue::as_prices);
        let price = |coin: &str| live.and_then(|p| p.get(coin)).copied();
        Header {
            btc_price: price("bitcoin"),
            eth_price: price("ethereum"),
            sol_price: price("solana"),
            reference_date: self.settings.reference_date,
            days_since_reference: (self.clock.now().date_naive() - self.settings.reference_date)
                .num_days(),
        }
    }
}
