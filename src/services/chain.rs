//! Ordered provider fallback for one metric.
//!
//! Providers are tried one after another, never in parallel, and each at most
//! once per resolution. Retries belong to the fetch client.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::clock::Clock;
use crate::errors::FetchError;
use crate::models::{Metric, MetricResult, MetricValue};
use crate::services::diagnostics::{Diagnostics, FailureRecord};
use crate::services::fetch::{FetchRequest, Fetcher};
use crate::services::providers::{Provider, ProviderRegistry};
use crate::telemetry::Telemetry;

/// Anything that can turn a metric into a cacheable result.
#[async_trait]
pub trait MetricResolver: Send + Sync {
    async fn resolve(&self, metric: &Metric) -> MetricResult;
}

pub struct ProviderChain {
    registry: ProviderRegistry,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<Diagnostics>,
    telemetry: Option<Arc<Telemetry>>,
}

impl ProviderChain {
    pub fn new(
        registry: ProviderRegistry,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            clock,
            diagnostics,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    async fn attempt(
        &self,
        provider: &dyn Provider,
        metric: &Metric,
        request: &FetchRequest,
    ) -> Result<MetricValue, FetchError> {
        let body = self.fetcher.fetch(request).await?;
        provider.parse(metric, &body)
    }

    fn observe(&self, provider: &str, outcome: &str) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_provider(provider, outcome);
        }
    }
}

#[async_trait]
impl MetricResolver for ProviderChain {
    async fn resolve(&self, metric: &Metric) -> MetricResult {
        let mut attempted = Vec::new();
        let mut last_error: Option<FetchError> = None;

        for provider in self.registry.providers_for(metric.kind()) {
            let Some(request) = provider.build_request(metric) else {
                debug!(
                    provider = provider.name(),
                    metric = %metric,
                    "Provider cannot serve metric parameters, skipping"
                );
                continue;
            };
            attempted.push(provider.name().to_string());

            match self.attempt(provider.as_ref(), metric, &request).await {
                Ok(value) => {
                    info!(
                        provider = provider.name(),
                        metric = %metric,
                        "Resolved {} from '{}'",
                        metric,
                        provider.name()
                    );
                    self.observe(provider.name(), "success");
                    return MetricResult::Value {
                        value,
                        fetched_at: self.clock.now(),
                        source: provider.name().to_string(),
                    };
                }
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        metric = %metric,
                        error = %error,
                        "Provider '{}' failed, trying next provider",
                        provider.name()
                    );
                    self.observe(provider.name(), error.kind());
                    self.diagnostics.record(FailureRecord::new(
                        self.clock.now(),
                        provider.name(),
                        &metric.to_string(),
                        &error,
                    ));
                    last_error = Some(error);
                }
            }
        }

        if attempted.is_empty() {
            debug!(metric = %metric, "No configured provider for metric");
        } else {
            warn!(
                metric = %metric,
                attempted = ?attempted,
                "All providers failed for {}",
                metric
            );
        }

        MetricResult::Unavailable {
            fetched_at: self.clock.now(),
            attempted,
            last_error,
        }
    }
}
