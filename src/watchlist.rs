//! Personal watchlist: live price against static target ranges.

use serde::Serialize;

use crate::models::{MetricResult, MetricValue};

/// A static `(low, high)` target for one coin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTarget {
    /// Market-aggregator coin id.
    pub coin: &'static str,
    /// Exchange spot symbol used when the aggregator is down.
    pub exchange_symbol: Option<&'static str>,
    pub low: f64,
    pub high: f64,
}

pub const TARGETS: &[PriceTarget] = &[
    target("bitcoin", Some("BTCUSDT"), 180_000.0, 220_000.0),
    target("ethereum", Some("ETHUSDT"), 12_500.0, 14_600.0),
    target("solana", Some("SOLUSDT"), 350.0, 450.0),
    target("render-token", Some("RENDERUSDT"), 29.2, 32.85),
    target("sui", Some("SUIUSDT"), 13.7, 15.7),
    target("injective-protocol", Some("INJUSDT"), 92.8, 106.0),
    target("uniswap", Some("UNIUSDT"), 39.2, 44.8),
    target("ondo-finance", Some("ONDOUSDT"), 4.31, 4.92),
    target("hedera-hashgraph", Some("HBARUSDT"), 0.356, 0.401),
    target("fetch-ai", Some("FETUSDT"), 9.52, 10.71),
    target("osmosis", None, 4.60, 5.18),
    target("decentraland", Some("MANAUSDT"), 1.24, 1.40),
    target("matic-network", None, 2.76, 3.11),
];

const fn target(
    coin: &'static str,
    exchange_symbol: Option<&'static str>,
    low: f64,
    high: f64,
) -> PriceTarget {
    PriceTarget {
        coin,
        exchange_symbol,
        low,
        high,
    }
}

impl PriceTarget {
    /// Percent moves from `price` to the low and high bound.
    pub fn distance(&self, price: f64) -> (f64, f64) {
        ((self.low / price - 1.0) * 100.0, (self.high / price - 1.0) * 100.0)
    }
}

pub fn coin_ids() -> Vec<String> {
    TARGETS.iter().map(|t| t.coin.to_string()).collect()
}

pub fn exchange_symbol(coin: &str) -> Option<&'static str> {
    TARGETS
        .iter()
        .find(|t| t.coin == coin)
        .and_then(|t| t.exchange_symbol)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistRow {
    pub coin: String,
    pub price: Option<f64>,
    pub low: f64,
    pub high: f64,
    pub pct_to_low: Option<f64>,
    pub pct_to_high: Option<f64>,
    /// e.g. "12% to 35%", empty without a price.
    pub upside: String,
}

/// One row per target; coins without a live price keep empty price columns.
pub fn rows(prices: &MetricResult) -> Vec<WatchlistRow> {
    let live = prices.value().and_then(MetricValue::as_prices);

    TARGETS
        .iter()
        .map(|target| {
            let price = live
                .and_then(|p| p.get(target.coin))
                .copied()
                .filter(|p| *p > 0.0);
            let distance = price.map(|p| target.distance(p));
            WatchlistRow {
                coin: target.coin.to_string(),
                price,
                low: target.low,
                high: target.high,
                pct_to_low: distance.map(|d| d.0),
                pct_to_high: distance.map(|d| d.1),
                upside: distance
                    .map(|(lo, hi)| format!("{lo:.0}% to {hi:.0}%"))
                    .unwrap_or_default(),
            }
        })
        .collect()
}
