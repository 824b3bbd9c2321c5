//! Prometheus metrics for the HTTP surface and the fetch layer.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Telemetry {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    /// Provider attempts by outcome (`success`, `http_error`, `transport_error`, `parse_error`).
    pub provider_requests_total: IntCounterVec,
    /// Cache lookups by result (`hit`, `miss`).
    pub metric_cache_lookups_total: IntCounterVec,
}

impl Telemetry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let provider_requests_total = IntCounterVec::new(
            Opts::new(
                "provider_requests_total",
                "Upstream provider attempts by outcome",
            ),
            &["provider", "outcome"],
        )?;
        let metric_cache_lookups_total = IntCounterVec::new(
            Opts::new("metric_cache_lookups_total", "Metric cache lookups by result"),
            &["result"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(provider_requests_total.clone()))?;
        registry.register(Box::new(metric_cache_lookups_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            provider_requests_total,
            metric_cache_lookups_total,
        })
    }

    pub fn record_provider(&self, provider: &str, outcome: &str) {
        self.provider_requests_total
            .with_label_values(&[provider, outcome])
            .inc();
    }

    pub fn record_cache(&self, result: &str) {
        self.metric_cache_lookups_total
            .with_label_values(&[result])
            .inc();
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
