//! Static priority table of providers per metric kind.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{
    alternative, binance, bybit, coingecko, coinglass, coinpaprika, glassnode, okx, AlternativeMe,
    BinanceFutures, BinanceSpot, Bybit, CoinGecko, CoinGlass, CoinPaprika, Glassnode, Okx, Provider,
};
use crate::models::MetricKind;

/// Base URLs and optional keys for every upstream source.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub binance_futures_base_url: String,
    pub binance_spot_base_url: String,
    pub bybit_base_url: String,
    pub okx_base_url: String,
    pub coinglass_base_url: String,
    pub coinglass_api_key: Option<String>,
    pub coinpaprika_base_url: String,
    pub alternative_base_url: String,
    pub glassnode_base_url: String,
    pub glassnode_api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
            coingecko_api_key: None,
            binance_futures_base_url: binance::DEFAULT_FUTURES_BASE_URL.to_string(),
            binance_spot_base_url: binance::DEFAULT_SPOT_BASE_URL.to_string(),
            bybit_base_url: bybit::DEFAULT_BASE_URL.to_string(),
            okx_base_url: okx::DEFAULT_BASE_URL.to_string(),
            coinglass_base_url: coinglass::DEFAULT_BASE_URL.to_string(),
            coinglass_api_key: None,
            coinpaprika_base_url: coinpaprika::DEFAULT_BASE_URL.to_string(),
            alternative_base_url: alternative::DEFAULT_BASE_URL.to_string(),
            glassnode_base_url: glassnode::DEFAULT_BASE_URL.to_string(),
            glassnode_api_key: None,
        }
    }
}

impl ProviderConfig {
    /// Point every provider at one base URL (mock servers in tests).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            coingecko_base_url: base_url.to_string(),
            binance_futures_base_url: base_url.to_string(),
            binance_spot_base_url: base_url.to_string(),
            bybit_base_url: base_url.to_string(),
            okx_base_url: base_url.to_string(),
            coinglass_base_url: base_url.to_string(),
            coinpaprika_base_url: base_url.to_string(),
            alternative_base_url: base_url.to_string(),
            glassnode_base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    chains: HashMap<MetricKind, Vec<Arc<dyn Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `provider` at the lowest priority for `kind`.
    pub fn register(&mut self, kind: MetricKind, provider: Arc<dyn Provider>) -> &mut Self {
        self.chains.entry(kind).or_default().push(provider);
        self
    }

    pub fn providers_for(&self, kind: MetricKind) -> &[Arc<dyn Provider>] {
        self.chains.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn provider_names(&self, kind: MetricKind) -> Vec<&'static str> {
        self.providers_for(kind).iter().map(|p| p.name()).collect()
    }

    /// The default table. Keyed providers without a key are left out, so their
    /// metrics resolve to unavailable instead of failing startup.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let coingecko: Arc<dyn Provider> = Arc::new(CoinGecko::new(
            config.coingecko_base_url.clone(),
            config.coingecko_api_key.clone(),
        ));
        let binance_spot: Arc<dyn Provider> =
            Arc::new(BinanceSpot::new(config.binance_spot_base_url.clone()));

        let mut registry = Self::new();
        registry
            .register(MetricKind::SpotPrices, coingecko.clone())
            .register(MetricKind::SpotPrices, binance_spot.clone())
            .register(MetricKind::PriceHistory, coingecko.clone())
            .register(MetricKind::PriceHistory, binance_spot)
            .register(
                MetricKind::FundingRate,
                Arc::new(BinanceFutures::new(config.binance_futures_base_url.clone())),
            )
            .register(
                MetricKind::FundingRate,
                Arc::new(Bybit::new(config.bybit_base_url.clone())),
            )
            .register(
                MetricKind::FundingRate,
                Arc::new(Okx::new(config.okx_base_url.clone())),
            )
            .register(MetricKind::BtcDominance, coingecko.clone())
            .register(
                MetricKind::BtcDominance,
                Arc::new(CoinPaprika::new(config.coinpaprika_base_url.clone())),
            )
            .register(
                MetricKind::FearGreed,
                Arc::new(AlternativeMe::new(config.alternative_base_url.clone())),
            )
            .register(MetricKind::MarketBreadth, coingecko);

        match non_empty(&config.coinglass_api_key) {
            Some(key) => {
                registry.register(
                    MetricKind::FundingRate,
                    Arc::new(CoinGlass::new(config.coinglass_base_url.clone(), key)),
                );
            }
            None => info!("COINGLASS_API_KEY not set, coinglass funding disabled"),
        }

        match non_empty(&config.glassnode_api_key) {
            Some(key) => {
                let glassnode: Arc<dyn Provider> =
                    Arc::new(Glassnode::new(config.glassnode_base_url.clone(), key));
                registry
                    .register(MetricKind::MvrvZScore, glassnode.clone())
                    .register(MetricKind::LthSopr, glassnode);
            }
            None => info!("GLASSNODE_API_KEY not set, on-chain metrics disabled"),
        }

        registry
    }
}

fn non_empty(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}
