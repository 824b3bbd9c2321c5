//! Shared data models spanning the fetch, cache, and signal layers.

pub mod metric;
pub mod result;
pub mod signal;

pub use metric::{Metric, MetricKind, MetricValue};
pub use result::MetricResult;
pub use signal::{Signal, SignalStatus};
