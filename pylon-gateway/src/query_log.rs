//! Ring-buffer query log: what ran, how long it took, what it returned.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use pylon_core::config::defaults::DEFAULT_QUERY_LOG_CAPACITY;
use pylon_core::models::SearchMode;

/// One logged query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub id: String,
    pub query: String,
    pub executed_mode: SearchMode,
    pub latency: Duration,
    pub result_count: usize,
    pub cache_hit: bool,
    pub degraded: bool,
    pub timestamp_epoch_ms: i64,
}

/// Append-only log with ring-buffer retention.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Vec<QueryLogEntry>,
    max_entries: usize,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUERY_LOG_CAPACITY)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[QueryLogEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }
}
