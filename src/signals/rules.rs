//! Static threshold rules. Lower bounds are inclusive: a value equal to the red
//! bound is red, a value equal to the yellow bound is yellow.

use crate::models::SignalStatus;

/// Rising-risk thresholds: `>= red` is Red, `>= yellow` is Yellow, else Green.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub yellow: f64,
    pub red: f64,
}

impl Thresholds {
    pub const fn new(yellow: f64, red: f64) -> Self {
        Self { yellow, red }
    }

    pub fn classify(&self, value: f64) -> SignalStatus {
        if value >= self.red {
            SignalStatus::Red
        } else if value >= self.yellow {
            SignalStatus::Yellow
        } else {
            SignalStatus::Green
        }
    }
}

/// Percent per 8h.
pub const FUNDING: Thresholds = Thresholds::new(0.05, 0.10);
pub const SENTIMENT: Thresholds = Thresholds::new(75.0, 90.0);
pub const LTH_SOPR: Thresholds = Thresholds::new(2.0, 4.0);
pub const MVRV_Z: Thresholds = Thresholds::new(3.0, 5.0);
/// Percent of alts up over 24h.
pub const ALT_BREADTH: Thresholds = Thresholds::new(60.0, 80.0);
/// Latest daily volume over the prior average.
pub const VOLUME_THRUST: Thresholds = Thresholds::new(1.5, 2.0);

/// Below this BTC dominance an alt rotation is considered to be forming.
pub const ROTATION_DOMINANCE: f64 = 50.0;

/// Fractional change over the lookback window.
pub const PRICE_DOWN: f64 = -0.10;
pub const PRICE_FLAT: f64 = 0.05;

pub fn classify_funding(percent: f64) -> SignalStatus {
    FUNDING.classify(percent)
}

pub fn classify_sentiment(value: u8) -> SignalStatus {
    SENTIMENT.classify(f64::from(value))
}

pub fn classify_price_change(change: f64) -> SignalStatus {
    if change < PRICE_DOWN {
        SignalStatus::Red
    } else if change < PRICE_FLAT {
        SignalStatus::Yellow
    } else {
        SignalStatus::Green
    }
}

pub fn classify_dominance(dominance: f64) -> SignalStatus {
    if dominance < ROTATION_DOMINANCE {
        SignalStatus::Yellow
    } else {
        SignalStatus::Green
    }
}

/// The spot-vs-perps proxy only reacts to overheated funding.
pub fn classify_spot_vs_perps(funding: SignalStatus) -> SignalStatus {
    if funding == SignalStatus::Red {
        SignalStatus::Yellow
    } else {
        SignalStatus::Green
    }
}
