//! Builds the signals table from cached metric results.
//!
//! A signal is `Unknown` exactly when every metric it reads is unavailable;
//! nothing here substitutes a number for a missing metric. The spot-vs-perps
//! row is the exception by construction: it reads the funding signal, not a
//! metric, and falls back to "Spot healthy" when funding is unknown.

use serde::Serialize;

use super::rules::{
    self, classify_dominance, classify_funding, classify_price_change, classify_sentiment,
    classify_spot_vs_perps,
};
use crate::models::{MetricResult, MetricValue, Signal, SignalStatus};

pub const PRICE_ACTION: &str = "Price Action";
pub const FUNDING_RATES: &str = "Funding Rates";
pub const SPOT_VS_PERPS: &str = "Spot vs Perps (proxy)";
pub const LTH_SOPR: &str = "LTH-SOPR";
pub const MVRV_Z: &str = "MVRV Z-Score";
pub const SENTIMENT: &str = "Sentiment (F&G)";
pub const ROTATION: &str = "Rotation (BTC.D, proxy)";
pub const ALT_BREADTH: &str = "Alt Breadth";
pub const VOLUME_THRUST: &str = "Volume Thrust";

/// Every metric result the signals table reads, as returned by the cache.
#[derive(Debug, Clone, Serialize)]
pub struct SignalInputs {
    pub btc_history: MetricResult,
    pub history_days: u32,
    pub btc_funding: MetricResult,
    pub sol_funding: MetricResult,
    pub lth_sopr: MetricResult,
    pub mvrv_z: MetricResult,
    pub fear_greed: MetricResult,
    pub btc_dominance: MetricResult,
    pub breadth: MetricResult,
}

pub fn evaluate(inputs: &SignalInputs) -> Vec<Signal> {
    let funding = funding_rates(&inputs.btc_funding, &inputs.sol_funding);
    let spot_vs_perps = spot_vs_perps(funding.status);
    vec![
        price_action(&inputs.btc_history, inputs.history_days),
        funding,
        spot_vs_perps,
        lth_sopr(&inputs.lth_sopr),
        mvrv_z(&inputs.mvrv_z),
        sentiment(&inputs.fear_greed),
        rotation(&inputs.btc_dominance),
        alt_breadth(&inputs.breadth),
        volume_thrust(&inputs.btc_history),
    ]
}

/// `N/A (no key)` when no provider is configured for any dependency.
fn unknown(name: &str, deps: &[&MetricResult]) -> Signal {
    let detail = if deps.iter().all(|r| r.is_unconfigured()) {
        "N/A (no key)"
    } else {
        "N/A"
    };
    Signal::new(name, SignalStatus::Unknown, detail)
}

pub fn price_action(history: &MetricResult, days: u32) -> Signal {
    let Some((prices, _)) = history.value().and_then(MetricValue::as_series) else {
        return unknown(PRICE_ACTION, &[history]);
    };
    let (Some(first), Some(last)) = (prices.first(), prices.last()) else {
        return unknown(PRICE_ACTION, &[history]);
    };

    let change = (last - first) / first;
    let status = classify_price_change(change);
    let word = match status {
        SignalStatus::Red => "Down",
        SignalStatus::Yellow => "Flat",
        _ => "Up",
    };
    Signal::new(
        PRICE_ACTION,
        status,
        format!("{word} {:.0}% in {days}d", change * 100.0),
    )
}

/// BTC drives the status; SOL stands in only when BTC is unavailable.
pub fn funding_rates(btc: &MetricResult, sol: &MetricResult) -> Signal {
    let (btc_rate, sol_rate) = (btc.percent(), sol.percent());
    let Some(driver) = btc_rate.or(sol_rate) else {
        return unknown(FUNDING_RATES, &[btc, sol]);
    };

    let mut detail = match btc_rate {
        Some(rate) => format!("BTC {rate:.3}%"),
        None => "BTC n/a".to_string(),
    };
    if let Some(rate) = sol_rate {
        detail.push_str(&format!(", SOL {rate:.3}%"));
    }
    Signal::new(FUNDING_RATES, classify_funding(driver), detail)
}

pub fn spot_vs_perps(funding: SignalStatus) -> Signal {
    let status = classify_spot_vs_perps(funding);
    let detail = if status == SignalStatus::Yellow {
        "Perps frothy"
    } else {
        "Spot healthy"
    };
    Signal::new(SPOT_VS_PERPS, status, detail)
}

pub fn lth_sopr(result: &MetricResult) -> Signal {
    let Some(value) = result.ratio() else {
        return unknown(LTH_SOPR, &[result]);
    };
    let status = rules::LTH_SOPR.classify(value);
    let note = match status {
        SignalStatus::Red => "distribution",
        SignalStatus::Yellow => "profit taking",
        _ => "calm",
    };
    Signal::new(LTH_SOPR, status, format!("{value:.2} ({note})"))
}

pub fn mvrv_z(result: &MetricResult) -> Signal {
    let Some(value) = result.ratio() else {
        return unknown(MVRV_Z, &[result]);
    };
    let status = rules::MVRV_Z.classify(value);
    let note = match status {
        SignalStatus::Red => "overheated",
        SignalStatus::Yellow => "hot",
        _ => "normal",
    };
    Signal::new(MVRV_Z, status, format!("{value:.2} ({note})"))
}

pub fn sentiment(result: &MetricResult) -> Signal {
    match result.value() {
        Some(MetricValue::Sentiment {
            value,
            classification,
        }) => {
            let status = classify_sentiment(*value);
            // Fixed labels for the hot bands; the index labels everything from 75 up the same.
            let label = match status {
                SignalStatus::Red => "Extreme Greed",
                SignalStatus::Yellow => "Greed",
                _ => classification.as_str(),
            };
            Signal::new(SENTIMENT, status, format!("{value} ({label})"))
        }
        _ => unknown(SENTIMENT, &[result]),
    }
}

pub fn rotation(result: &MetricResult) -> Signal {
    let Some(dominance) = result.percent() else {
        return unknown(ROTATION, &[result]);
    };
    let status = classify_dominance(dominance);
    let mut detail = format!("BTC.D {dominance:.1}%");
    if status == SignalStatus::Yellow {
        detail.push_str(" (alt rotation forming)");
    }
    Signal::new(ROTATION, status, detail)
}

pub fn alt_breadth(result: &MetricResult) -> Signal {
    match result.value() {
        Some(MetricValue::Breadth { advancing, total }) if *total > 0 => {
            let share = f64::from(*advancing) / f64::from(*total) * 100.0;
            Signal::new(
                ALT_BREADTH,
                rules::ALT_BREADTH.classify(share),
                format!("{advancing}/{total} alts up 24h ({share:.0}%)"),
            )
        }
        _ => unknown(ALT_BREADTH, &[result]),
    }
}

pub fn volume_thrust(history: &MetricResult) -> Signal {
    let Some((_, volumes)) = history.value().and_then(MetricValue::as_series) else {
        return unknown(VOLUME_THRUST, &[history]);
    };
    let Some((latest, prior)) = volumes.split_last() else {
        return unknown(VOLUME_THRUST, &[history]);
    };

    if prior.is_empty() {
        return unknown(VOLUME_THRUST, &[history]);
    }
    let average = prior.iter().sum::<f64>() / prior.len() as f64;
    if average <= 0.0 {
        return unknown(VOLUME_THRUST, &[history]);
    }
    let thrust = latest / average;
    Signal::new(
        VOLUME_THRUST,
        rules::VOLUME_THRUST.classify(thrust),
        format!("{thrust:.2}x {}d avg volume", prior.len()),
    )
}
