//! Cycle-top monitoring dashboard.
//!
//! Polls public market-data APIs through ordered provider chains, caches the
//! outcome per metric for a short TTL, and derives heuristic cycle-top
//! signals plus a watchlist comparison for the HTTP surface.

pub mod config;
pub mod core;
pub mod dashboard;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
pub mod telemetry;
pub mod watchlist;
