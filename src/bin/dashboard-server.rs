//! Cycle-end dashboard server
//!
//! Serves the signals, watchlist and diagnostics panels over HTTP. Metrics are
//! fetched lazily on each render and cached per metric for the configured TTL.

use cyclewatch::config::{get_environment, Config};
use cyclewatch::core::http::start_server;
use cyclewatch::logging;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env();
    let port = config.port;

    info!("Starting cycle-end dashboard");
    info!(environment = %get_environment(), "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    info!(
        cache_ttl_secs = config.cache_ttl.as_secs(),
        price_ttl_secs = config.price_cache_ttl.as_secs(),
        max_attempts = config.retry.max_attempts,
        "Metric cache configured"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down dashboard server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
