use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl SignalStatus {
    /// Badge shown in the signals table.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Green => "🟢",
            Self::Yellow => "🟡",
            Self::Red => "🔴",
            Self::Unknown => "⚪",
        }
    }

    pub fn legend(&self) -> &'static str {
        match self {
            Self::Green => "healthy",
            Self::Yellow => "heating up",
            Self::Red => "high top risk",
            Self::Unknown => "unavailable",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge())
    }
}

/// A derived, presentation-facing classification. Recomputed on every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub name: String,
    pub status: SignalStatus,
    pub detail: String,
}

impl Signal {
    pub fn new(name: impl Into<String>, status: SignalStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}
