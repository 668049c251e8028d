//! RetrievalEngine: mode dispatch, breaker-gated semantic path, fallback.
//!
//! keyword → always the lexical index. semantic/hybrid → gated by the
//! breaker on both external dependencies; every attempt reports its
//! outcome back. auto → keyword first, escalating to hybrid when the
//! result set is empty or the top score sits below the relevance floor.
//! Degradation is preferred over failure: a request that wanted the
//! semantic path but could not get it is served keyword results with
//! the `degraded` flag set, never an error.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use pylon_breaker::CircuitBreaker;
use pylon_core::config::RetrievalConfig;
use pylon_core::constants::{DEP_EMBEDDING_PROVIDER, DEP_VECTOR_INDEX};
use pylon_core::errors::{GatewayError, GatewayResult};
use pylon_core::models::{sort_ranked, DegradationEvent, ScoredItem, SearchMode, SearchOutcome};
use pylon_core::traits::{ICorpusStore, IEmbeddingProvider, IVectorIndex};

use crate::expansion;
use crate::fusion;
use crate::keyword::KeywordIndex;

/// The retrieval engine. One per gateway; safe to share across callers.
pub struct RetrievalEngine {
    keyword: KeywordIndex,
    provider: Arc<dyn IEmbeddingProvider>,
    index: Arc<dyn IVectorIndex>,
    corpus: Arc<dyn ICorpusStore>,
    breaker: Arc<CircuitBreaker>,
    config: RetrievalConfig,
    events: Mutex<Vec<DegradationEvent>>,
}

impl RetrievalEngine {
    /// Build the engine, constructing the keyword index from the corpus.
    pub fn new(
        provider: Arc<dyn IEmbeddingProvider>,
        index: Arc<dyn IVectorIndex>,
        corpus: Arc<dyn ICorpusStore>,
        breaker: Arc<CircuitBreaker>,
        config: RetrievalConfig,
    ) -> Self {
        let documents = corpus.documents();
        let keyword = KeywordIndex::build(&documents);
        info!(
            documents = keyword.len(),
            provider = provider.name(),
            index = index.name(),
            "retrieval engine initialized"
        );
        Self {
            keyword,
            provider,
            index,
            corpus,
            breaker,
            config,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Execute a search. See the module docs for mode semantics.
    pub fn search(
        &self,
        query: &str,
        mode: SearchMode,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> GatewayResult<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(GatewayError::invalid_query("query text is empty"));
        }
        if top_k == 0 {
            return Err(GatewayError::invalid_query("top_k must be positive"));
        }
        let top_k = top_k.min(self.config.max_top_k);

        let outcome = match mode {
            SearchMode::Keyword => self.keyword_outcome(query, filters, top_k, false),
            SearchMode::Semantic => self.semantic_or_fallback(query, filters, top_k),
            SearchMode::Hybrid => self.hybrid_or_fallback(query, filters, top_k),
            SearchMode::Auto => self.auto(query, filters, top_k),
        };

        debug!(
            %mode,
            executed = %outcome.executed_mode,
            degraded = outcome.degraded,
            results = outcome.items.len(),
            "search complete"
        );
        Ok(outcome)
    }

    /// Drain degradation events accumulated since the last drain.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Number of documents in the keyword index.
    pub fn indexed_documents(&self) -> usize {
        self.keyword.len()
    }

    // ── Mode implementations ─────────────────────────────────────────

    fn keyword_outcome(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
        degraded: bool,
    ) -> SearchOutcome {
        let ranked = self.keyword.search(query, filters, top_k);
        let items = self.attach_snippets(ranked);
        if degraded {
            SearchOutcome::degraded(items, SearchMode::Keyword)
        } else {
            SearchOutcome::new(items, SearchMode::Keyword)
        }
    }

    fn semantic_or_fallback(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> SearchOutcome {
        match self.semantic_candidates(query, filters, top_k) {
            Ok(ranked) => {
                let mut items = self.attach_snippets(ranked);
                sort_ranked(&mut items);
                SearchOutcome::new(items, SearchMode::Semantic)
            }
            Err(failure) => {
                self.note_degradation(&failure, SearchMode::Keyword);
                self.keyword_outcome(query, filters, top_k, true)
            }
        }
    }

    fn hybrid_or_fallback(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> SearchOutcome {
        let depth = top_k * self.config.candidate_multiplier.max(1);
        let keyword_ranked = self.keyword.search(query, filters, depth);

        match self.semantic_candidates(query, filters, depth) {
            Ok(semantic_ranked) => {
                let fused = fusion::fuse(
                    &[
                        keyword_ranked.into_iter().map(|(id, _)| id).collect(),
                        semantic_ranked.into_iter().map(|(id, _)| id).collect(),
                    ],
                    self.config.rrf_k,
                );
                let mut items = self.attach_snippets(fused);
                items.truncate(top_k);
                sort_ranked(&mut items);
                SearchOutcome::new(items, SearchMode::Hybrid)
            }
            Err(failure) => {
                self.note_degradation(&failure, SearchMode::Keyword);
                let mut keyword_ranked = keyword_ranked;
                keyword_ranked.truncate(top_k);
                let items = self.attach_snippets(keyword_ranked);
                SearchOutcome::degraded(items, SearchMode::Keyword)
            }
        }
    }

    fn auto(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> SearchOutcome {
        let keyword_only = self.keyword_outcome(query, filters, top_k, false);

        let adequate = keyword_only
            .top_score()
            .is_some_and(|score| score >= self.config.relevance_floor);
        if adequate {
            return keyword_only;
        }

        debug!(
            top_score = ?keyword_only.top_score(),
            floor = self.config.relevance_floor,
            "keyword results inadequate, escalating"
        );
        let escalated = self.hybrid_or_fallback(query, filters, top_k);
        if escalated.executed_mode == SearchMode::Hybrid {
            escalated
        } else {
            // Escalation wanted the semantic path and could not get it.
            SearchOutcome::degraded(keyword_only.items, SearchMode::Keyword)
        }
    }

    // ── Semantic path ────────────────────────────────────────────────

    /// Embed the query and run nearest-neighbor lookup, reporting every
    /// attempt to the breaker. Returns `(item_id, similarity)` ranked
    /// nearest first.
    fn semantic_candidates(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> GatewayResult<Vec<(String, f64)>> {
        if !self.breaker.allow(DEP_EMBEDDING_PROVIDER) {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                reason: "circuit open".to_string(),
            });
        }
        if !self.provider.is_available() {
            self.breaker
                .record_failure(DEP_EMBEDDING_PROVIDER, "provider reports unavailable");
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                reason: "provider reports unavailable".to_string(),
            });
        }

        let text = if self.config.query_expansion {
            expansion::expand_query(query)
        } else {
            query.to_string()
        };

        let vector = match self.provider.embed(&text) {
            Ok(vector) => {
                self.breaker.record_success(DEP_EMBEDDING_PROVIDER);
                vector
            }
            Err(failure) => {
                self.breaker
                    .record_failure(DEP_EMBEDDING_PROVIDER, &failure.to_string());
                return Err(failure);
            }
        };

        if !self.breaker.allow(DEP_VECTOR_INDEX) {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_VECTOR_INDEX.to_string(),
                reason: "circuit open".to_string(),
            });
        }
        match self.index.nearest(&vector, top_k, filters) {
            Ok(neighbors) => {
                self.breaker.record_success(DEP_VECTOR_INDEX);
                Ok(neighbors
                    .into_iter()
                    .map(|(item_id, distance)| (item_id, (1.0 - distance).max(0.0)))
                    .collect())
            }
            Err(failure) => {
                self.breaker
                    .record_failure(DEP_VECTOR_INDEX, &failure.to_string());
                Err(failure)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn attach_snippets(&self, ranked: Vec<(String, f64)>) -> Vec<ScoredItem> {
        ranked
            .into_iter()
            .map(|(item_id, score)| {
                let snippet = self.corpus.snippet(&item_id).unwrap_or_default();
                ScoredItem {
                    item_id,
                    score,
                    snippet,
                }
            })
            .collect()
    }

    fn note_degradation(&self, failure: &GatewayError, fallback_mode: SearchMode) {
        let dependency = match failure {
            GatewayError::ProviderUnavailable { dependency, .. }
            | GatewayError::ProviderTimeout { dependency, .. } => dependency.clone(),
            _ => "unknown".to_string(),
        };
        warn!(%failure, %fallback_mode, "semantic path unavailable, degrading");
        if let Ok(mut events) = self.events.lock() {
            events.push(DegradationEvent {
                dependency,
                failure: failure.to_string(),
                fallback_mode,
                timestamp: Utc::now(),
            });
        }
    }
}
