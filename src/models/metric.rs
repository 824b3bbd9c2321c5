use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A requested upstream value. Structural equality makes it the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// Spot USD prices for a batch of market-aggregator coin ids.
    SpotPrices { coins: Vec<String> },
    /// Daily price and volume series for one coin.
    PriceHistory { coin: String, days: u32 },
    /// Latest perpetual funding rate, percent per 8h.
    FundingRate { symbol: String },
    /// BTC share of total market capitalization, percent.
    BtcDominance,
    /// Sentiment index 0-100 with its text classification.
    FearGreed,
    /// 24h change across the top-N coins by market cap.
    MarketBreadth { top: u32 },
    MvrvZScore,
    LthSopr,
}

/// Registry key: which provider chain serves a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    SpotPrices,
    PriceHistory,
    FundingRate,
    BtcDominance,
    FearGreed,
    MarketBreadth,
    MvrvZScore,
    LthSopr,
}

impl Metric {
    pub fn spot_prices<I, S>(coins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SpotPrices {
            coins: coins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn price_history(coin: impl Into<String>, days: u32) -> Self {
        Self::PriceHistory {
            coin: coin.into(),
            days,
        }
    }

    pub fn funding_rate(symbol: impl Into<String>) -> Self {
        Self::FundingRate {
            symbol: symbol.into(),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Self::SpotPrices { .. } => MetricKind::SpotPrices,
            Self::PriceHistory { .. } => MetricKind::PriceHistory,
            Self::FundingRate { .. } => MetricKind::FundingRate,
            Self::BtcDominance => MetricKind::BtcDominance,
            Self::FearGreed => MetricKind::FearGreed,
            Self::MarketBreadth { .. } => MetricKind::MarketBreadth,
            Self::MvrvZScore => MetricKind::MvrvZScore,
            Self::LthSopr => MetricKind::LthSopr,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpotPrices { coins } => write!(f, "spot_prices[{}]", coins.len()),
            Self::PriceHistory { coin, days } => write!(f, "price_history:{coin}:{days}d"),
            Self::FundingRate { symbol } => write!(f, "funding_rate:{symbol}"),
            Self::BtcDominance => f.write_str("btc_dominance"),
            Self::FearGreed => f.write_str("fear_greed"),
            Self::MarketBreadth { top } => write!(f, "market_breadth:top{top}"),
            Self::MvrvZScore => f.write_str("mvrv_z_score"),
            Self::LthSopr => f.write_str("lth_sopr"),
        }
    }
}

/// A parsed provider value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MetricValue {
    /// Coin id to USD price.
    Prices(BTreeMap<String, f64>),
    /// Oldest-first daily closes and volumes.
    Series { prices: Vec<f64>, volumes: Vec<f64> },
    Percent(f64),
    Sentiment { value: u8, classification: String },
    Breadth { advancing: u32, total: u32 },
    Ratio(f64),
}

impl MetricValue {
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Self::Percent(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_ratio(&self) -> Option<f64> {
        match self {
            Self::Ratio(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_prices(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Self::Prices(prices) => Some(prices),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<(&[f64], &[f64])> {
        match self {
            Self::Series { prices, volumes } => Some((prices, volumes)),
            _ => None,
        }
    }
}
