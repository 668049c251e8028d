use serde::{Deserialize, Serialize};

use super::defaults;

/// Rate-limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Usage windows idle beyond `window + idle_grace_secs` are collected.
    pub idle_grace_secs: u64,
    /// Pool anonymous callers per transport origin. When false, all
    /// anonymous traffic shares one bucket.
    pub pool_anonymous_by_origin: bool,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            idle_grace_secs: defaults::DEFAULT_IDLE_GRACE_SECS,
            pool_anonymous_by_origin: true,
        }
    }
}
