//! Wires the process-scoped fetch client, provider chain, cache, and dashboard.

use std::sync::Arc;

use crate::config::Config;
use crate::core::clock::{Clock, SystemClock};
use crate::dashboard::{Dashboard, DashboardSettings};
use crate::services::providers::ProviderRegistry;
use crate::services::{Diagnostics, FetchClient, Fetcher, MetricCache, ProviderChain};
use crate::telemetry::Telemetry;

/// Build the dashboard against live upstream APIs.
pub fn build_dashboard(config: &Config, telemetry: Arc<Telemetry>) -> Dashboard {
    let fetcher: Arc<dyn Fetcher> =
        Arc::new(FetchClient::new(config.fetch_timeout, config.retry.clone()));
    build_dashboard_with(config, fetcher, Arc::new(SystemClock), telemetry)
}

/// Build with an injected fetcher and clock.
pub fn build_dashboard_with(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    telemetry: Arc<Telemetry>,
) -> Dashboard {
    let diagnostics = Arc::new(Diagnostics::default());
    let registry = ProviderRegistry::from_config(&config.providers);
    let chain = ProviderChain::new(registry, fetcher, clock.clone(), diagnostics.clone())
        .with_telemetry(telemetry.clone());
    let cache = MetricCache::new(Arc::new(chain), clock.clone()).with_telemetry(telemetry);

    Dashboard::new(
        Arc::new(cache),
        diagnostics,
        clock,
        DashboardSettings::from(config),
    )
}
