use chrono::{DateTime, Utc};
use serde::Serialize;

use super::metric::MetricValue;
use crate::errors::FetchError;

/// What the metric cache stores for one metric: a value tagged with the
/// provider that produced it, or an explicit unavailable marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricResult {
    Value {
        value: MetricValue,
        fetched_at: DateTime<Utc>,
        source: String,
    },
    Unavailable {
        fetched_at: DateTime<Utc>,
        /// Providers tried, in priority order.
        attempted: Vec<String>,
        last_error: Option<FetchError>,
    },
}

impl MetricResult {
    pub fn value(&self) -> Option<&MetricValue> {
        match self {
            Self::Value { value, .. } => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Value { .. })
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        match self {
            Self::Value { fetched_at, .. } | Self::Unavailable { fetched_at, .. } => *fetched_at,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Value { source, .. } => Some(source),
            Self::Unavailable { .. } => None,
        }
    }

    /// Unavailable because no provider was configured at all (e.g. missing key).
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::Unavailable { attempted, .. } if attempted.is_empty())
    }

    pub fn percent(&self) -> Option<f64> {
        self.value().and_then(MetricValue::as_percent)
    }

    pub fn ratio(&self) -> Option<f64> {
        self.value().and_then(MetricValue::as_ratio)
    }
}
