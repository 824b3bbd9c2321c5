//! Data-fetch layer: fetch client, provider chains, metric cache, diagnostics.

pub mod cache;
pub mod chain;
pub mod diagnostics;
pub mod fetch;
pub mod providers;

pub use cache::{CacheState, MetricCache};
pub use chain::{MetricResolver, ProviderChain};
pub use diagnostics::{Diagnostics, FailureRecord};
pub use fetch::{FetchClient, FetchOutcome, FetchRequest, Fetcher, RetryPolicy};
