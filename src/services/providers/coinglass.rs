//! CoinGlass aggregated funding (API key required).

use serde_json::Value;

use super::{base_asset, number, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://open-api-v3.coinglass.com";

pub struct CoinGlass {
    base_url: String,
    api_key: String,
    exchange: String,
}

impl CoinGlass {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            exchange: "Binance".to_string(),
        }
    }
}

impl Provider for CoinGlass {
    fn name(&self) -> &'static str {
        "coinglass"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::FundingRate { symbol } => Some(
                FetchRequest::get(format!("{}/api/futures/funding_rates", self.base_url))
                    .query("symbol", base_asset(symbol)?)
                    .query("exchange", self.exchange.clone())
                    .header("coinglassSecret", self.api_key.clone()),
            ),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::FundingRate { .. }) {
            return Err(unsupported(self.name(), metric));
        }
        // Already a percentage.
        body.pointer("/data/0/uMarginList")
            .and_then(Value::as_array)
            .and_then(|list| list.last())
            .and_then(|entry| entry.get("rate"))
            .and_then(number)
            .map(MetricValue::Percent)
            .ok_or_else(|| FetchError::parse("missing `data[0].uMarginList[-1].rate`"))
    }
}
