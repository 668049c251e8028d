use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Search strategy requested by a caller or executed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Lexical term matching. No external dependency.
    Keyword,
    /// Embedding + nearest-neighbor lookup. Breaker-gated.
    Semantic,
    /// Keyword and semantic candidates fused by RRF.
    Hybrid,
    /// Keyword first, escalating when results are empty or weak.
    Auto,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Keyword,
        SearchMode::Semantic,
        SearchMode::Hybrid,
        SearchMode::Auto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
            SearchMode::Auto => "auto",
        }
    }

    /// Whether this mode wants the embedding/index path at all.
    pub fn wants_semantic(self) -> bool {
        !matches!(self, SearchMode::Keyword)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ranked result: item identifier, mode-specific score, snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: String,
    pub score: f64,
    pub snippet: String,
}

/// Sort results strictly descending by score, ties broken ascending by
/// item id. Every ranked list the engine emits goes through this so the
/// ordering is deterministic regardless of which path produced it.
pub fn sort_ranked(items: &mut [ScoredItem]) {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
}

/// The engine's answer for one search: ranked items plus execution metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub items: Vec<ScoredItem>,
    /// The mode that actually ran; may differ from the requested mode.
    pub executed_mode: SearchMode,
    /// True when a cheaper path was served than the caller asked for.
    pub degraded: bool,
}

impl SearchOutcome {
    pub fn new(items: Vec<ScoredItem>, executed_mode: SearchMode) -> Self {
        Self {
            items,
            executed_mode,
            degraded: false,
        }
    }

    pub fn degraded(items: Vec<ScoredItem>, executed_mode: SearchMode) -> Self {
        Self {
            items,
            executed_mode,
            degraded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top score, or `None` when there are no results.
    pub fn top_score(&self) -> Option<f64> {
        self.items.first().map(|i| i.score)
    }
}
