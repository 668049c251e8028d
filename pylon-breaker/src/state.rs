use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Breaker state for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerState {
    /// Calls pass through; failures are counted.
    Closed,
    /// Calls are rejected until the cool-down elapses.
    Open,
    /// Exactly one trial call is allowed through.
    HalfOpen,
}

/// Health record for one named dependency.
///
/// Only the state machine in [`crate::CircuitBreaker`] mutates this;
/// callers observe, they never set state directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub opened_at: Option<DateTime<Utc>>,
    /// Current cool-down; grows on failed trials, resets on recovery.
    pub cooldown_secs: u64,
    pub last_transition: DateTime<Utc>,
    /// Set while a half-open trial is in flight. Not persisted: a
    /// restart abandons any in-flight trial.
    #[serde(skip)]
    pub(crate) trial_in_flight: bool,
}

impl HealthRecord {
    pub(crate) fn new(now: DateTime<Utc>, cooldown_secs: u64) -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            cooldown_secs,
            last_transition: now,
            trial_in_flight: false,
        }
    }
}
