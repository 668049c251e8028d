use serde::{Deserialize, Serialize};

use super::defaults;

/// Semantic-cache configuration. Entries live in memory only and are
/// lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime (seconds). Older entries answer as misses.
    pub ttl_secs: u64,
    /// Capacity bound; least-recently-used entries are evicted first.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}
