use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Decay-tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Staleness half-life in days: an untouched item reaches score 0.5
    /// after this long.
    pub half_life_days: f64,
    /// When set, item metadata survives restarts via a JSON snapshot here.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            half_life_days: defaults::DEFAULT_HALF_LIFE_DAYS,
            snapshot_path: None,
        }
    }
}
