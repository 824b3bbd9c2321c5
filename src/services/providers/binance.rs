//! Binance USD-M futures (funding) and spot (prices, klines).

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::{column, fraction_to_percent, number, number_at, series, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;
use crate::watchlist;

pub const DEFAULT_FUTURES_BASE_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_SPOT_BASE_URL: &str = "https://api.binance.com";

// Kline row layout: [open_time, open, high, low, close, volume, close_time, quote_volume, ...]
const KLINE_CLOSE: usize = 4;
const KLINE_QUOTE_VOLUME: usize = 7;

pub struct BinanceFutures {
    base_url: String,
}

impl BinanceFutures {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for BinanceFutures {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::FundingRate { symbol } => Some(
                FetchRequest::get(format!("{}/fapi/v1/fundingRate", self.base_url))
                    .query("symbol", symbol.clone())
                    .query("limit", "1"),
            ),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::FundingRate { .. }) {
            return Err(unsupported(self.name(), metric));
        }
        // Array of records, oldest first.
        let latest = body
            .as_array()
            .and_then(|rows| rows.last())
            .ok_or_else(|| FetchError::parse("empty funding history"))?;
        let rate = number_at(latest, "/fundingRate")?;
        Ok(MetricValue::Percent(fraction_to_percent(rate)))
    }
}

pub struct BinanceSpot {
    base_url: String,
}

impl BinanceSpot {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for BinanceSpot {
    fn name(&self) -> &'static str {
        "binance-spot"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::SpotPrices { coins } => {
                let symbols: Vec<String> = coins
                    .iter()
                    .filter_map(|coin| watchlist::exchange_symbol(coin))
                    .map(|symbol| format!("\"{symbol}\""))
                    .collect();
                if symbols.is_empty() {
                    return None;
                }
                Some(
                    FetchRequest::get(format!("{}/api/v3/ticker/price", self.base_url))
                        .query("symbols", format!("[{}]", symbols.join(","))),
                )
            }
            Metric::PriceHistory { coin, days } => {
                let symbol = watchlist::exchange_symbol(coin)?;
                Some(
                    FetchRequest::get(format!("{}/api/v3/klines", self.base_url))
                        .query("symbol", symbol)
                        .query("interval", "1d")
                        .query("limit", days.to_string()),
                )
            }
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        let rows = body
            .as_array()
            .ok_or_else(|| FetchError::parse("response is not an array"))?;

        match metric {
            Metric::SpotPrices { coins } => {
                let by_symbol: HashMap<&str, &String> = coins
                    .iter()
                    .filter_map(|coin| watchlist::exchange_symbol(coin).map(|s| (s, coin)))
                    .collect();

                let prices: BTreeMap<String, f64> = rows
                    .iter()
                    .filter_map(|row| {
                        let symbol = row.get("symbol")?.as_str()?;
                        let coin = by_symbol.get(symbol)?;
                        let price = row.get("price").and_then(number)?;
                        Some(((*coin).clone(), price))
                    })
                    .collect();
                if prices.is_empty() {
                    return Err(FetchError::parse("no ticker prices in response"));
                }
                Ok(MetricValue::Prices(prices))
            }
            Metric::PriceHistory { .. } => series(
                column(rows, KLINE_CLOSE)?,
                column(rows, KLINE_QUOTE_VOLUME)?,
            ),
            _ => Err(unsupported(self.name(), metric)),
        }
    }
}
