//! alternative.me crypto Fear & Greed index.

use serde::Deserialize;
use serde_json::Value;

use super::{unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.alternative.me";

#[derive(Deserialize)]
struct FngResponse {
    data: Vec<FngData>,
}

#[derive(Deserialize)]
struct FngData {
    value: String,
    value_classification: String,
}

pub struct AlternativeMe {
    base_url: String,
}

impl AlternativeMe {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for AlternativeMe {
    fn name(&self) -> &'static str {
        "alternative.me"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::FearGreed => Some(
                FetchRequest::get(format!("{}/fng/", self.base_url))
                    .query("limit", "1")
                    .query("format", "json"),
            ),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        if !matches!(metric, Metric::FearGreed) {
            return Err(unsupported(self.name(), metric));
        }
        let response = FngResponse::deserialize(body)
            .map_err(|e| FetchError::parse(format!("unexpected index payload: {e}")))?;
        let latest = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::parse("empty index data"))?;
        let value = latest
            .value
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| FetchError::parse(format!("index value `{}` out of range", latest.value)))?;

        Ok(MetricValue::Sentiment {
            value,
            classification: latest.value_classification,
        })
    }
}
