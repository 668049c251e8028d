use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Circuit-breaker configuration, shared by every tracked dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,
    /// Initial open-state cool-down (seconds).
    pub cooldown_secs: u64,
    /// Cool-down growth factor applied on a failed half-open trial.
    pub backoff_multiplier: f64,
    /// Cap on the grown cool-down (seconds).
    pub max_cooldown_secs: u64,
    /// When set, breaker state survives restarts via a JSON snapshot here.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: defaults::DEFAULT_COOLDOWN_SECS,
            backoff_multiplier: defaults::DEFAULT_BACKOFF_MULTIPLIER,
            max_cooldown_secs: defaults::DEFAULT_MAX_COOLDOWN_SECS,
            snapshot_path: None,
        }
    }
}
