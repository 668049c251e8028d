use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::search::{ScoredItem, SearchMode};

/// A single inbound query, as handed over by the transport layer.
///
/// `identity` is the raw credential string, if any. `origin` is an opaque
/// transport-supplied key (connection hash, forwarded address) used to
/// pool anonymous callers; it is never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub identity: Option<String>,
    pub origin: Option<String>,
    pub text: String,
    pub mode: SearchMode,
    /// Exact-match label constraints, e.g. `topic = "architecture"`.
    pub filters: BTreeMap<String, String>,
    pub top_k: usize,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            identity: None,
            origin: None,
            text: text.into(),
            mode,
            filters: BTreeMap::new(),
            top_k: 10,
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// The gateway's answer: ranked items plus enough metadata for the caller
/// to detect silent degradation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub items: Vec<ScoredItem>,
    /// The mode that actually executed.
    pub executed_mode: SearchMode,
    pub degraded: bool,
    pub cache_hit: bool,
}
