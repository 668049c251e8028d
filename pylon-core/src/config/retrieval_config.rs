use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF smoothing constant for hybrid fusion.
    pub rrf_k: u32,
    /// Keyword top score below which `auto` escalates. Explicit by
    /// requirement: the escalation trigger is configuration, not a
    /// hard-coded threshold.
    pub relevance_floor: f64,
    /// Candidate depth per path before fusion, as a multiple of `top_k`.
    pub candidate_multiplier: usize,
    /// Hard cap on caller-supplied `top_k`.
    pub max_top_k: usize,
    /// Timeout for each embedding-provider call (milliseconds).
    pub provider_timeout_ms: u64,
    /// Enrich short queries with domain synonyms before embedding.
    pub query_expansion: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            relevance_floor: defaults::DEFAULT_RELEVANCE_FLOOR,
            candidate_multiplier: defaults::DEFAULT_CANDIDATE_MULTIPLIER,
            max_top_k: defaults::DEFAULT_MAX_TOP_K,
            provider_timeout_ms: defaults::DEFAULT_PROVIDER_TIMEOUT_MS,
            query_expansion: true,
        }
    }
}
