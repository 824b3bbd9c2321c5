use serde_json::Value;

use super::{base_asset, fraction_to_percent, number_at, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

pub struct Okx {
    base_url: String,
}

impl Okx {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for Okx {
    fn name(&self) -> &'static str {
        "okx"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::FundingRate { symbol } => {
                let base = base_asset(symbol)?;
                Some(
                    FetchRequest::get(format!("{}/api/v5/public/funding-rate", self.base_url))
                        .query("instId", format!("{base}-USDT-SWAP")),
                )
            }
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::FundingRate { .. }) {
            return Err(unsupported(self.name(), metric));
        }
        let code = body.get("code").and_then(Value::as_str).unwrap_or("0");
        if code != "0" {
            let message = body.get("msg").and_then(Value::as_str).unwrap_or_default();
            return Err(FetchError::parse(format!("code {code}: {message}")));
        }
        let rate = number_at(body, "/data/0/fundingRate")?;
        Ok(MetricValue::Percent(fraction_to_percent(rate)))
    }
}
