//! Bounded in-memory buffer of recent provider failures.
//!
//! Lives for the process lifetime and is independent of the metric cache:
//! a manual refresh clears cached metrics but keeps the failure history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::{truncate, FetchError, MAX_SNIPPET_CHARS};

pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub at: DateTime<Utc>,
    pub provider: String,
    pub metric: String,
    pub kind: String,
    pub error: String,
}

impl FailureRecord {
    pub fn new(at: DateTime<Utc>, provider: &str, metric: &str, error: &FetchError) -> Self {
        Self {
            at,
            provider: provider.to_string(),
            metric: metric.to_string(),
            kind: error.kind().to_string(),
            error: truncate(&error.to_string(), MAX_SNIPPET_CHARS),
        }
    }
}

#[derive(Debug)]
pub struct Diagnostics {
    capacity: usize,
    entries: Mutex<VecDeque<FailureRecord>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, record: FailureRecord) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<FailureRecord> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
