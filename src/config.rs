//! Environment-driven configuration.
//!
//! Every value has a default; malformed values are logged and replaced by the
//! default, and missing provider keys only disable that provider.

use chrono::NaiveDate;
use std::env;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::services::fetch::RetryPolicy;
use crate::services::providers::ProviderConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 120;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BACKOFF_MS: u64 = 500;
pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const DEFAULT_BREADTH_TOP: u32 = 50;

/// BTC halving, the default start of the days-since counter.
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 19).unwrap_or_default()
}

/// Deployment environment name (`APP_ENV`), `sandbox` when unset.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cache_ttl: Duration,
    /// Shorter TTL for spot prices.
    pub price_cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub retry: RetryPolicy,
    pub reference_date: NaiveDate,
    pub history_days: u32,
    pub breadth_top: u32,
    pub providers: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            price_cache_ttl: Duration::from_secs(DEFAULT_PRICE_CACHE_TTL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            reference_date: default_reference_date(),
            history_days: DEFAULT_HISTORY_DAYS,
            breadth_top: DEFAULT_BREADTH_TOP,
            providers: ProviderConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let d = &defaults.providers;

        let max_attempts: usize = parsed(&lookup, "FETCH_MAX_ATTEMPTS", defaults.retry.max_attempts);
        let backoff_ms: u64 = parsed(&lookup, "FETCH_BACKOFF_MS", DEFAULT_BACKOFF_MS);

        let reference_date = match lookup("REFERENCE_DATE") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Invalid REFERENCE_DATE, using default");
                defaults.reference_date
            }),
            None => defaults.reference_date,
        };

        let providers = ProviderConfig {
            coingecko_base_url: base_url(&lookup, "COINGECKO_BASE_URL", &d.coingecko_base_url),
            coingecko_api_key: api_key(&lookup, "COINGECKO_API_KEY"),
            binance_futures_base_url: base_url(
                &lookup,
                "BINANCE_FUTURES_BASE_URL",
                &d.binance_futures_base_url,
            ),
            binance_spot_base_url: base_url(
                &lookup,
                "BINANCE_SPOT_BASE_URL",
                &d.binance_spot_base_url,
            ),
            bybit_base_url: base_url(&lookup, "BYBIT_BASE_URL", &d.bybit_base_url),
            okx_base_url: base_url(&lookup, "OKX_BASE_URL", &d.okx_base_url),
            coinglass_base_url: base_url(&lookup, "COINGLASS_BASE_URL", &d.coinglass_base_url),
            coinglass_api_key: api_key(&lookup, "COINGLASS_API_KEY"),
            coinpaprika_base_url: base_url(
                &lookup,
                "COINPAPRIKA_BASE_URL",
                &d.coinpaprika_base_url,
            ),
            alternative_base_url: base_url(
                &lookup,
                "ALTERNATIVE_BASE_URL",
                &d.alternative_base_url,
            ),
            glassnode_base_url: base_url(&lookup, "GLASSNODE_BASE_URL", &d.glassnode_base_url),
            glassnode_api_key: api_key(&lookup, "GLASSNODE_API_KEY"),
        };

        Self {
            port: parsed(&lookup, "PORT", defaults.port),
            cache_ttl: Duration::from_secs(parsed(
                &lookup,
                "CACHE_TTL_SECONDS",
                DEFAULT_CACHE_TTL_SECS,
            )),
            price_cache_ttl: Duration::from_secs(parsed(
                &lookup,
                "PRICE_CACHE_TTL_SECONDS",
                DEFAULT_PRICE_CACHE_TTL_SECS,
            )),
            fetch_timeout: Duration::from_secs(parsed(
                &lookup,
                "FETCH_TIMEOUT_SECONDS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )),
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(backoff_ms)),
            reference_date,
            history_days: parsed(&lookup, "HISTORY_DAYS", defaults.history_days),
            breadth_top: parsed(&lookup, "BREADTH_TOP", defaults.breadth_top),
            providers,
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

fn api_key<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

fn base_url<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default.to_string();
    };
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            raw.trim().trim_end_matches('/').to_string()
        }
        _ => {
            warn!(key = key, value = %raw, "Invalid base URL, using default");
            default.to_string()
        }
    }
}
