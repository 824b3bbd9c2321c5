use serde_json::Value;

use super::{field, fraction_to_percent, number_at, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

pub struct Bybit {
    base_url: String,
}

impl Bybit {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for Bybit {
    fn name(&self) -> &'static str {
        "bybit"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::FundingRate { symbol } => Some(
                FetchRequest::get(format!("{}/v5/market/tickers", self.base_url))
                    .query("category", "linear")
                    .query("symbol", symbol.clone()),
            ),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::FundingRate { .. }) {
            return Err(unsupported(self.name(), metric));
        }
        // Bybit reports API errors inside a 200 response.
        let code = field(body, "/retCode")?.as_i64().unwrap_or(-1);
        if code != 0 {
            let message = body
                .get("retMsg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(FetchError::parse(format!("retCode {code}: {message}")));
        }
        let rate = number_at(body, "/result/list/0/fundingRate")?;
        Ok(MetricValue::Percent(fraction_to_percent(rate)))
    }
}
