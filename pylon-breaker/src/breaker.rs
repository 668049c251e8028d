//! The circuit breaker proper.
//!
//! All transitions run under the map's exclusive per-dependency guard,
//! so concurrent `record_*` calls cannot miscount toward the threshold
//! and only one caller can win the half-open trial slot.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use pylon_core::config::BreakerConfig;
use pylon_core::errors::{GatewayError, GatewayResult};

use crate::state::{BreakerState, HealthRecord};

/// A read-only view of one dependency's health, for reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DependencyStatus {
    pub dependency: String,
    pub state: BreakerState,
    pub consecutive_failures: u32,
}

/// Per-dependency circuit breaker.
pub struct CircuitBreaker {
    records: DashMap<String, HealthRecord>,
    config: BreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            records: DashMap::new(),
            config,
        }
    }

    /// Whether a call to `dependency` should be attempted right now.
    ///
    /// Must be checked before every attempt; a `true` from a half-open
    /// breaker claims the single trial slot, so the caller is obliged to
    /// follow up with `record_success` or `record_failure`.
    pub fn allow(&self, dependency: &str) -> bool {
        self.allow_at(dependency, Utc::now())
    }

    pub fn allow_at(&self, dependency: &str, now: DateTime<Utc>) -> bool {
        let mut record = self
            .records
            .entry(dependency.to_string())
            .or_insert_with(|| HealthRecord::new(now, self.config.cooldown_secs));

        match record.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let reopened = record.opened_at.unwrap_or(record.last_transition);
                let expiry = reopened + chrono::Duration::seconds(record.cooldown_secs as i64);
                if now >= expiry {
                    record.state = BreakerState::HalfOpen;
                    record.last_transition = now;
                    record.trial_in_flight = true;
                    debug!(dependency, "cool-down elapsed, admitting trial call");
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => {
                if record.trial_in_flight {
                    false
                } else {
                    record.trial_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful call to `dependency`.
    pub fn record_success(&self, dependency: &str) {
        self.record_success_at(dependency, Utc::now());
    }

    pub fn record_success_at(&self, dependency: &str, now: DateTime<Utc>) {
        let mut record = self
            .records
            .entry(dependency.to_string())
            .or_insert_with(|| HealthRecord::new(now, self.config.cooldown_secs));

        match record.state {
            BreakerState::Closed => {
                record.consecutive_failures = 0;
            }
            BreakerState::HalfOpen | BreakerState::Open => {
                info!(dependency, "dependency recovered, closing breaker");
                record.state = BreakerState::Closed;
                record.consecutive_failures = 0;
                record.opened_at = None;
                record.cooldown_secs = self.config.cooldown_secs;
                record.last_transition = now;
                record.trial_in_flight = false;
            }
        }
    }

    /// Record a failed call. Timeouts, error responses, and malformed
    /// responses all count identically.
    pub fn record_failure(&self, dependency: &str, reason: &str) {
        self.record_failure_at(dependency, reason, Utc::now());
    }

    pub fn record_failure_at(&self, dependency: &str, reason: &str, now: DateTime<Utc>) {
        let mut record = self
            .records
            .entry(dependency.to_string())
            .or_insert_with(|| HealthRecord::new(now, self.config.cooldown_secs));

        match record.state {
            BreakerState::Closed => {
                record.consecutive_failures += 1;
                warn!(
                    dependency,
                    reason,
                    failures = record.consecutive_failures,
                    threshold = self.config.failure_threshold,
                    "dependency call failed"
                );
                if record.consecutive_failures >= self.config.failure_threshold {
                    record.state = BreakerState::Open;
                    record.opened_at = Some(now);
                    record.last_transition = now;
                    info!(
                        dependency,
                        cooldown_secs = record.cooldown_secs,
                        "failure threshold reached, opening breaker"
                    );
                }
            }
            BreakerState::HalfOpen => {
                // Trial failed: reopen with a grown cool-down.
                let grown = (record.cooldown_secs as f64 * self.config.backoff_multiplier)
                    .round() as u64;
                record.cooldown_secs = grown.min(self.config.max_cooldown_secs);
                record.consecutive_failures += 1;
                record.state = BreakerState::Open;
                record.opened_at = Some(now);
                record.last_transition = now;
                record.trial_in_flight = false;
                warn!(
                    dependency,
                    reason,
                    cooldown_secs = record.cooldown_secs,
                    "trial call failed, reopening breaker"
                );
            }
            BreakerState::Open => {
                // A straggler that ignored `allow`. Count it, stay open.
                record.consecutive_failures += 1;
            }
        }
    }

    /// Current state for a dependency. Unknown dependencies are Closed.
    pub fn state(&self, dependency: &str) -> BreakerState {
        self.records
            .get(dependency)
            .map(|r| r.state)
            .unwrap_or(BreakerState::Closed)
    }

    /// Health view across all tracked dependencies, for reporting.
    pub fn health(&self) -> Vec<DependencyStatus> {
        let mut statuses: Vec<DependencyStatus> = self
            .records
            .iter()
            .map(|entry| DependencyStatus {
                dependency: entry.key().clone(),
                state: entry.value().state,
                consecutive_failures: entry.value().consecutive_failures,
            })
            .collect();
        statuses.sort_by(|a, b| a.dependency.cmp(&b.dependency));
        statuses
    }

    /// Reset all records. Test/teardown hook.
    pub fn reset(&self) {
        self.records.clear();
    }

    // ── Snapshot persistence (configuration choice) ──────────────────

    /// Serialize all records for persistence across restarts.
    pub fn snapshot(&self) -> BTreeMap<String, HealthRecord> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Replace all records from a snapshot.
    pub fn restore(&self, snapshot: BTreeMap<String, HealthRecord>) {
        self.records.clear();
        for (dependency, record) in snapshot {
            self.records.insert(dependency, record);
        }
    }

    /// Write the snapshot as JSON to `path`.
    pub fn save_to(&self, path: &Path) -> GatewayResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json).map_err(|e| GatewayError::Internal {
            reason: format!("writing breaker snapshot {}: {e}", path.display()),
        })
    }

    /// Load records from a JSON snapshot at `path`.
    pub fn load_from(&self, path: &Path) -> GatewayResult<()> {
        let json = std::fs::read_to_string(path).map_err(|e| GatewayError::Internal {
            reason: format!("reading breaker snapshot {}: {e}", path.display()),
        })?;
        let snapshot: BTreeMap<String, HealthRecord> = serde_json::from_str(&json)?;
        self.restore(snapshot);
        Ok(())
    }
}
