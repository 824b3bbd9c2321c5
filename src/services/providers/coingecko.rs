//! CoinGecko market aggregator: spot prices, history, dominance, breadth.

use serde_json::Value;
use std::collections::BTreeMap;

use super::{column, field, number, number_at, series, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Excluded from alt breadth alongside BTC itself.
const STABLECOINS: &[&str] = &[
    "usdt", "usdc", "dai", "fdusd", "tusd", "usde", "usds", "pyusd", "busd", "usdd",
];

pub struct CoinGecko {
    base_url: String,
    api_key: Option<String>,
}

impl CoinGecko {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request(&self, path: &str) -> FetchRequest {
        let request = FetchRequest::get(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.header("x-cg-demo-api-key", key.clone()),
            None => request,
        }
    }
}

impl Provider for CoinGecko {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::SpotPrices { coins } if !coins.is_empty() => Some(
                self.request("/simple/price")
                    .query("ids", coins.join(","))
                    .query("vs_currencies", "usd"),
            ),
            Metric::PriceHistory { coin, days } => Some(
                self.request(&format!("/coins/{coin}/market_chart"))
                    .query("vs_currency", "usd")
                    .query("days", days.to_string())
                    .query("interval", "daily"),
            ),
            Metric::BtcDominance => Some(self.request("/global")),
            Metric::MarketBreadth { top } => Some(
                self.request("/coins/markets")
                    .query("vs_currency", "usd")
                    .query("order", "market_cap_desc")
                    .query("per_page", top.to_string())
                    .query("page", "1")
                    .query("price_change_percentage", "24h"),
            ),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        match metric {
            Metric::SpotPrices { coins } => {
                let prices: BTreeMap<String, f64> = coins
                    .iter()
                    .filter_map(|coin| {
                        body.get(coin)
                            .and_then(|entry| entry.get("usd"))
                            .and_then(number)
                            .map(|price| (coin.clone(), price))
                    })
                    .collect();
                if prices.is_empty() {
                    return Err(FetchError::parse("no usd prices in response"));
                }
                Ok(MetricValue::Prices(prices))
            }
            Metric::PriceHistory { .. } => {
                let prices = array(body, "/prices")?;
                let volumes = array(body, "/total_volumes")?;
                series(column(prices, 1)?, column(volumes, 1)?)
            }
            Metric::BtcDominance => {
                number_at(body, "/data/market_cap_percentage/btc").map(MetricValue::Percent)
            }
            Metric::MarketBreadth { .. } => breadth(body),
            _ => Err(unsupported(self.name(), metric)),
        }
    }
}

fn array<'a>(body: &'a Value, pointer: &str) -> Result<&'a Vec<Value>, FetchError> {
    field(body, pointer)?
        .as_array()
        .ok_or_else(|| FetchError::parse(format!("`{pointer}` is not an array")))
}

fn breadth(body: &Value) -> Result<MetricValue, FetchError> {
    let coins = body
        .as_array()
        .ok_or_else(|| FetchError::parse("markets response is not an array"))?;

    let mut advancing = 0u32;
    let mut total = 0u32;
    for coin in coins {
        let id = coin.get("id").and_then(Value::as_str).unwrap_or_default();
        let symbol = coin
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if id == "bitcoin" || STABLECOINS.contains(&symbol.as_str()) {
            continue;
        }
        let Some(change) = coin.get("price_change_percentage_24h").and_then(number) else {
            continue;
        };
        total += 1;
        if change > 0.0 {
            advancing += 1;
        }
    }

    if total == 0 {
        return Err(FetchError::parse("no alt coins with 24h change"));
    }
    Ok(MetricValue::Breadth { advancing, total })
}
