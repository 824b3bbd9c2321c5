//! Upstream providers: one strategy object per source.
//!
//! A provider knows how to shape a request for the metrics it serves and how to
//! pull a single value out of that source's response envelope. It performs no
//! I/O itself; the provider chain hands its request to the fetch client.

use serde_json::Value;

use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub mod alternative;
pub mod binance;
pub mod bybit;
pub mod coingecko;
pub mod coinglass;
pub mod coinpaprika;
pub mod glassnode;
pub mod okx;
pub mod registry;

pub use alternative::AlternativeMe;
pub use binance::{BinanceFutures, BinanceSpot};
pub use bybit::Bybit;
pub use coingecko::CoinGecko;
pub use coinglass::CoinGlass;
pub use coinpaprika::CoinPaprika;
pub use glassnode::Glassnode;
pub use okx::Okx;
pub use registry::{ProviderConfig, ProviderRegistry};

pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when this provider cannot express the metric's parameters; the
    /// chain then skips it without counting an attempt.
    fn build_request(&self, metric: &Metric) -> Option<FetchRequest>;

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError>;
}

/// Numbers arrive as JSON numbers or as decimal strings depending on the exchange.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub(crate) fn field<'a>(value: &'a Value, pointer: &str) -> Result<&'a Value, FetchError> {
    value
        .pointer(pointer)
        .ok_or_else(|| FetchError::parse(format!("missing `{pointer}`")))
}

pub(crate) fn number_at(value: &Value, pointer: &str) -> Result<f64, FetchError> {
    number(field(value, pointer)?)
        .ok_or_else(|| FetchError::parse(format!("`{pointer}` is not a number")))
}

pub(crate) fn unsupported(provider: &str, metric: &Metric) -> FetchError {
    FetchError::parse(format!("{provider} does not serve {metric}"))
}

/// Exchange-native funding is a decimal fraction per 8h.
pub(crate) fn fraction_to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Perp symbols are quoted as `<BASE>USDT`.
pub(crate) fn base_asset(symbol: &str) -> Option<&str> {
    symbol.strip_suffix("USDT").filter(|base| !base.is_empty())
}

/// Validate an oldest-first daily series before it reaches the signal rules.
pub(crate) fn series(prices: Vec<f64>, volumes: Vec<f64>) -> Result<MetricValue, FetchError> {
    if prices.len() < 2 {
        return Err(FetchError::parse("price series needs at least two points"));
    }
    if prices.iter().any(|p| *p <= 0.0) {
        return Err(FetchError::parse("price series contains non-positive values"));
    }
    if volumes.len() < 2 || volumes.iter().any(|v| *v < 0.0) {
        return Err(FetchError::parse("volume series missing or negative"));
    }
    if volumes[..volumes.len() - 1].iter().sum::<f64>() <= 0.0 {
        return Err(FetchError::parse("volume series has no prior volume"));
    }
    Ok(MetricValue::Series { prices, volumes })
}

/// Extract column `index` of each row of an array-of-arrays payload.
pub(crate) fn column(rows: &[Value], index: usize) -> Result<Vec<f64>, FetchError> {
    rows.iter()
        .map(|row| {
            row.get(index)
                .and_then(number)
                .ok_or_else(|| FetchError::parse(format!("row column {index} is not a number")))
        })
        .collect()
}
