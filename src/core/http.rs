//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::Config;
use crate::core::bootstrap::build_dashboard;
use crate::dashboard::{Dashboard, DashboardSnapshot};
use crate::errors::ConfigError;
use crate::models::Signal;
use crate::services::FailureRecord;
use crate::telemetry::Telemetry;
use crate::watchlist::WatchlistRow;

pub const SERVICE_NAME: &str = "cyclewatch-dashboard";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub telemetry: Arc<Telemetry>,
    pub start_time: Arc<Instant>,
    pub dashboard: Arc<Dashboard>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .telemetry
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Increment in-flight requests
    state.telemetry.http_requests_in_flight.inc();

    // Process request
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    // Decrement in-flight requests
    state.telemetry.http_requests_in_flight.dec();

    // Record metrics
    state.telemetry.http_requests_total.inc();
    state
        .telemetry
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    // Log if error status
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Full page: header, signals, watchlist, diagnostics.
async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot().await)
}

async fn get_signals(State(state): State<AppState>) -> Json<Vec<Signal>> {
    Json(state.dashboard.signals().await)
}

async fn get_watchlist(State(state): State<AppState>) -> Json<Vec<WatchlistRow>> {
    Json(state.dashboard.watchlist().await)
}

async fn get_diagnostics(State(state): State<AppState>) -> Json<Vec<FailureRecord>> {
    Json(state.dashboard.diagnostics())
}

/// "Refresh now": clear the metric cache and render again.
async fn refresh(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.refresh().await)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/signals", get(get_signals))
        .route("/api/watchlist", get(get_watchlist))
        .route("/api/diagnostics", get(get_diagnostics))
        .route("/api/refresh", post(refresh))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), ConfigError> {
    let telemetry = Arc::new(Telemetry::new()?);
    let dashboard = Arc::new(build_dashboard(&config, telemetry.clone()));

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        telemetry,
        start_time: Arc::new(Instant::now()),
        dashboard,
    };
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ConfigError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!("Dashboard available at http://{}/api/dashboard", addr);
    axum::serve(listener, app)
        .await
        .map_err(|source| ConfigError::Serve { addr, source })?;

    Ok(())
}
