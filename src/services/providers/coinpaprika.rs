use serde_json::Value;

use super::{number_at, unsupported, Provider};
use crate::errors::FetchError;
use crate::models::{Metric, MetricValue};
use crate::services::fetch::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.coinpaprika.com";

pub struct CoinPaprika {
    base_url: String,
}

impl CoinPaprika {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Provider for CoinPaprika {
    fn name(&self) -> &'static str {
        "coinpaprika"
    }

    fn build_request(&self, metric: &Metric) -> Option<FetchRequest> {
        match metric {
            Metric::BtcDominance => Some(FetchRequest::get(format!("{}/v1/global", self.base_url))),
            _ => None,
        }
    }

    fn parse(&self, metric: &Metric, body: &Value) -> Result<MetricValue, FetchError> {
        match metric {
            Metric::BtcDominance => {
                number_at(body, "/bitcoin_dominance_percentage").map(MetricValue::Percent)
            }
            _ => Err(unsupported(self.name(), metric)),
        }
    }
}
