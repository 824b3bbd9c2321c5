//! Glassnode on-chain metrics (API key required).

use serde_json::Value;

use super::{number_at, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.glassnode.com";

pub struct Glassnode {
    base_url: String,
    api_key: String,
}

impl Glassnode {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl Provider for Glassnode {
    fn name(&self) -> &'static str {
        "glassnode"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        let path = match metric {
            Metric::MvrvZScore => "/v1/metrics/market/mvrv_z_score",
            Metric::LthSopr => "/v1/metrics/transactions/sopr_long_term_holders",
            _ => return None,
        };
        Some(
            FetchRequest::get(format!("{}{}", self.base_url, path))
                .query("a", "BTC")
                .query("i", "24h")
                .query("api_key", self.api_key.clone()),
        )
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::MvrvZScore | Metric::LthSopr) {
            return Err(unsupported(self.name(), metric));
        }
        // [{"t": <unix>, "v": <value>}, ...] oldest first.
        let latest = body
            .as_array()
            .and_then(|points| points.last())
            .ok_or_else(|| FetchError::parse("empty metric series"))?;
        number_at(latest, "/v").map(MetricValue::Ratio)
    }
}
