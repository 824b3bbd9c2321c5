//! Cycle-top signals derived from metric results by static thresholds.

pub mod board;
pub mod rules;

pub use board::{evaluate, SignalInputs};
pub use rules::Thresholds;
