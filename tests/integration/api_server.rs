//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and the dashboard routes.


use cyclewatch::config::Config;
use cyclewatch::core::http::start_server;
use cyclewatch::errors::ConfigError;
use serde_json::Value;

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "cyclewatch-dashboard");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/api/signals").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "provider_requests_total",
        "metric_cache_lookups_total",
    ] {
        assert!(body.contains(name), "Expected {name} metric");
    }
}

#[tokio::test]
async fn dashboard_endpoint_returns_every_panel() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/dashboard").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let signals = body["signals"].as_array().expect("signals array");
    assert_eq!(signals.len(), 9);
    assert_eq!(signals[0]["name"], "Price Action");
    assert_eq!(body["header"]["reference_date"], "2024-04-19");
    assert!(body["header"]["btc_price"].is_null());
    assert_eq!(body["watchlist"].as_array().map(Vec::len), Some(13));
}

#[tokio::test]
async fn signals_endpoint_reports_sentiment() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/signals").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let sentiment = body
        .as_array()
        .and_then(|signals| signals.iter().find(|s| s["name"] == "Sentiment (F&G)"))
        .expect("sentiment signal");
    assert_eq!(sentiment["status"], "yellow");
    assert_eq!(sentiment["detail"], "81 (Greed)");
}

#[tokio::test]
async fn watchlist_endpoint_lists_targets() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/watchlist").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body[0]["coin"], "bitcoin");
    assert_eq!(body[0]["upside"], "");
}

#[tokio::test]
async fn diagnostics_endpoint_lists_recent_failures() {
    let app = TestApiServer::new().await;

    let before: Value = app.server.get("/api/diagnostics").await.json();
    assert_eq!(before.as_array().map(Vec::len), Some(0));

    let _ = app.server.get("/api/signals").await;

    let after: Value = app.server.get("/api/diagnostics").await.json();
    let failures = after.as_array().expect("diagnostics array");
    assert!(!failures.is_empty());
    assert!(failures.len() <= 8);
    assert_eq!(failures[0]["kind"], "http_error");
}

#[tokio::test]
async fn refresh_endpoint_refetches_upstream() {
    let app = TestApiServer::new().await;

    let _ = app.server.get("/api/signals").await;
    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["signals"].as_array().map(Vec::len), Some(9));

    let fng_requests = app
        .upstream
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/fng/")
        .count();
    assert_eq!(fng_requests, 2);
}

#[tokio::test]
async fn api_server_handles_sequential_requests() {
    let app = TestApiServer::new().await;

    for _ in 0..5 {
        let response = app.server.get("/health").await;
        assert_eq!(response.status_code(), 200);
    }
}

#[tokio::test]
async fn start_server_reports_port_in_use_as_bind_error() {
    let taken = tokio::net::TcpListener::bind("0.0.0.0:0")
        .await
        .expect("reserve port");
    let port = taken.local_addr().expect("local addr").port();

    let config = Config {
        port,
        ..Config::default()
    };
    let err = start_server(config).await.expect_err("port is taken");

    assert!(matches!(err, ConfigError::Bind { .. }), "{err}");
}
