//! Failure taxonomy shared by the fetch client, providers, and the cache.

use serde::Serialize;
use thiserror::Error;

/// Longest upstream body or message kept on an error.
pub const MAX_SNIPPET_CHARS: usize = 200;

/// Why a single provider attempt did not produce a value.
///
/// All variants are recoverable at the provider chain level: the chain moves on
/// to the next provider and, once every provider is exhausted, collapses the
/// last error into an unavailable metric.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// DNS, connection, or timeout failure.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The response did not match the shape the provider expects.
    #[error("parse error: {message}")]
    Parse { message: String },
}

impl FetchError {
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            body: truncate(body.trim(), MAX_SNIPPET_CHARS),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: truncate(&message.into(), MAX_SNIPPET_CHARS),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: truncate(&message.into(), MAX_SNIPPET_CHARS),
        }
    }

    /// Transport failures, 429 and 5xx are worth another attempt; every other
    /// status is permanent for the attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Parse { .. } => false,
        }
    }

    /// Stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http_error",
            Self::Transport { .. } => "transport_error",
            Self::Parse { .. } => "parse_error",
        }
    }
}

/// Failures that stop the server binary.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener was up, then the serve loop failed.
    #[error("HTTP server on {addr} stopped: {source}")]
    Serve {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("telemetry registry error: {0}")]
    Telemetry(#[from] prometheus::Error),
}

/// Truncate on a char boundary.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
