//! Named default values for every tunable. Config structs fall back to
//! these via `#[serde(default)]`.

/// Rolling quota window applied to every tier unless overridden.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Extra idle time beyond the window before a usage window is collected.
pub const DEFAULT_IDLE_GRACE_SECS: u64 = 300;

/// Consecutive failures before a dependency's breaker opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Initial open-state cool-down.
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// Cool-down growth on a failed half-open trial.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Upper bound on the grown cool-down.
pub const DEFAULT_MAX_COOLDOWN_SECS: u64 = 300;

/// RRF smoothing constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Keyword top score below which `auto` escalates to hybrid.
pub const DEFAULT_RELEVANCE_FLOOR: f64 = 0.1;

/// Candidate depth per path before fusion, as a multiple of `top_k`.
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 3;

/// Hard cap on a caller-supplied `top_k`.
pub const DEFAULT_MAX_TOP_K: usize = 50;

/// Timeout applied to each embedding-provider call.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;

/// Semantic-cache entry lifetime.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Semantic-cache capacity bound.
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Staleness half-life: an untouched, unverified item reaches decay
/// score 0.5 after this many days.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;

/// Ring-buffer capacity of the gateway query log.
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;
