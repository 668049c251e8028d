//! The orchestrator.
//!
//! Per query: resolve tier → rate-limit → cache lookup → engine on miss
//! → cache store + decay touches. A denied request stops at the limiter
//! and touches nothing further. Every response names the mode that
//! actually executed so callers can detect silent degradation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pylon_admission::{Admission, RateLimiter, TierRegistry};
use pylon_breaker::CircuitBreaker;
use pylon_cache::{Fingerprint, SemanticCache};
use pylon_core::config::TierPolicyConfig;
use pylon_core::errors::{GatewayError, GatewayResult};
use pylon_core::models::{HealthReport, SearchOutcome};
use pylon_core::traits::{ICorpusStore, IEmbeddingProvider, IVectorIndex};
use pylon_core::{GatewayConfig, QueryRequest, QueryResponse};
use pylon_decay::{DecayReportEntry, DecayTracker};
use pylon_retrieval::RetrievalEngine;

use crate::health;
use crate::policy::ModePolicy;
use crate::query_log::{QueryLog, QueryLogEntry};

/// The gateway: one per process, shared across all callers.
///
/// Every component is owned here and wired explicitly at construction.
/// There are no ambient singletons, so tests substitute fakes freely.
pub struct Gateway {
    registry: Arc<TierRegistry>,
    limiter: RateLimiter,
    breaker: Arc<CircuitBreaker>,
    cache: SemanticCache,
    engine: RetrievalEngine,
    decay: DecayTracker,
    corpus: Arc<dyn ICorpusStore>,
    policy: ModePolicy,
    query_log: Mutex<QueryLog>,
    config: GatewayConfig,
}

impl Gateway {
    /// Assemble a gateway from config and its external collaborators.
    ///
    /// When snapshot paths are configured and present, breaker state and
    /// decay metadata are restored from them.
    pub fn new(
        config: GatewayConfig,
        registry: Arc<TierRegistry>,
        provider: Arc<dyn IEmbeddingProvider>,
        index: Arc<dyn IVectorIndex>,
        corpus: Arc<dyn ICorpusStore>,
    ) -> GatewayResult<Self> {
        config.validate()?;

        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
        if let Some(path) = &config.breaker.snapshot_path {
            if path.exists() {
                breaker.load_from(path)?;
                info!(path = %path.display(), "breaker state restored");
            }
        }

        let decay = DecayTracker::new(config.decay.clone());
        if let Some(path) = &config.decay.snapshot_path {
            if path.exists() {
                decay.load_from(path)?;
                info!(path = %path.display(), items = decay.len(), "decay metadata restored");
            }
        }

        let engine = RetrievalEngine::new(
            provider,
            index,
            Arc::clone(&corpus),
            Arc::clone(&breaker),
            config.retrieval.clone(),
        );

        Ok(Self {
            registry,
            limiter: RateLimiter::new(config.limiter.clone()),
            breaker,
            cache: SemanticCache::new(&config.cache),
            engine,
            decay,
            corpus,
            policy: ModePolicy::new(config.tiers.clone()),
            query_log: Mutex::new(QueryLog::new()),
            config,
        })
    }

    /// Serve one query at the current time.
    pub fn query(&self, request: QueryRequest) -> GatewayResult<QueryResponse> {
        self.query_at(request, Utc::now())
    }

    /// Serve one query at an explicit instant (test clock injection).
    pub fn query_at(
        &self,
        request: QueryRequest,
        now: DateTime<Utc>,
    ) -> GatewayResult<QueryResponse> {
        let started = Instant::now();

        // 1. Resolve identity → tier. Total: never an error.
        let tier = self.registry.resolve(request.identity.as_deref());

        // 2. Rate limit. A denial stops here: no cache, no engine.
        let pool_key = self
            .limiter
            .pool_key(request.identity.as_deref(), request.origin.as_deref());
        let quota = self.policy.quota(tier);
        if let Admission::Denied { retry_after } = self.limiter.check_at(&pool_key, quota, now) {
            debug!(%tier, %pool_key, ?retry_after, "rate limited");
            return Err(GatewayError::RateLimited { retry_after });
        }

        // 3. Tier policy decides the mode the engine will see.
        let decision = self.policy.effective_mode(tier, request.mode);

        // 4. Cache lookup under the normalized fingerprint.
        let fingerprint = Fingerprint::compute(&request.text, decision.mode, &request.filters);
        if let Some(outcome) = self.cache.get_at(&fingerprint, now) {
            self.touch_all(&outcome, now);
            let response = self.respond(&request, outcome, decision.downgraded, true, started);
            return Ok(response);
        }

        // 5. Miss: run the engine, store, touch.
        let outcome = self
            .engine
            .search(&request.text, decision.mode, &request.filters, request.top_k)?;
        self.cache.put_at(fingerprint, outcome.clone(), now);
        self.touch_all(&outcome, now);

        for event in self.engine.drain_degradation_events() {
            info!(
                dependency = %event.dependency,
                failure = %event.failure,
                fallback = %event.fallback_mode,
                "served degraded"
            );
        }

        Ok(self.respond(&request, outcome, decision.downgraded, false, started))
    }

    // ── Administrative surface ───────────────────────────────────────

    /// Replace the tier policy table after validating it.
    pub fn reload_tiers(&self, table: TierPolicyConfig) -> GatewayResult<()> {
        table.validate()?;
        self.policy.reload(table);
        info!("tier policy reloaded");
        Ok(())
    }

    /// Staleness report for operators, most stale first.
    pub fn decay_report(&self, limit: usize) -> Vec<DecayReportEntry> {
        self.decay.report(limit)
    }

    pub fn decay_report_at(&self, limit: usize, now: DateTime<Utc>) -> Vec<DecayReportEntry> {
        self.decay.report_at(limit, now)
    }

    /// Administrative refresh of one item. Records the content
    /// fingerprint the corpus currently holds, so later drift between
    /// what was verified and what is stored stays detectable.
    pub fn mark_verified(&self, item_id: &str) {
        self.mark_verified_at(item_id, Utc::now());
    }

    pub fn mark_verified_at(&self, item_id: &str, now: DateTime<Utc>) {
        let fingerprint = self
            .corpus
            .documents()
            .into_iter()
            .find(|d| d.item_id == item_id)
            .map(|d| d.content_fingerprint());
        self.decay
            .mark_verified_with_fingerprint_at(item_id, fingerprint, now);
    }

    /// Flag an item archived. Idempotent.
    pub fn archive(&self, item_id: &str) -> bool {
        self.decay.archive(item_id)
    }

    /// Current dependency health and gateway metrics.
    pub fn health_report(&self) -> HealthReport {
        health::build_report(
            &self.breaker,
            &self.cache,
            &self.decay,
            self.engine.indexed_documents(),
        )
    }

    /// Persist breaker and decay snapshots to their configured paths.
    /// A no-op for subsystems without a configured path.
    pub fn save_snapshots(&self) -> GatewayResult<()> {
        if let Some(path) = &self.config.breaker.snapshot_path {
            self.breaker.save_to(path)?;
        }
        if let Some(path) = &self.config.decay.snapshot_path {
            self.decay.save_to(path)?;
        }
        Ok(())
    }

    /// Collect idle rate-limiter windows. Operator/timer driven.
    pub fn collect_idle_windows_at(&self, now: DateTime<Utc>) -> usize {
        self.limiter.evict_idle_at(now)
    }

    /// The credential registry, for key administration.
    pub fn registry(&self) -> &TierRegistry {
        &self.registry
    }

    /// Recent query log entries, newest last.
    pub fn recent_queries(&self, limit: usize) -> Vec<QueryLogEntry> {
        let log = self.lock_log();
        let entries = log.entries();
        entries
            .iter()
            .skip(entries.len().saturating_sub(limit))
            .cloned()
            .collect()
    }

    /// Average query latency over the retained log.
    pub fn avg_query_latency(&self) -> std::time::Duration {
        self.lock_log().avg_latency()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn touch_all(&self, outcome: &SearchOutcome, now: DateTime<Utc>) {
        for item in &outcome.items {
            self.decay.touch_at(&item.item_id, now);
        }
    }

    fn respond(
        &self,
        request: &QueryRequest,
        outcome: SearchOutcome,
        downgraded: bool,
        cache_hit: bool,
        started: Instant,
    ) -> QueryResponse {
        let response = QueryResponse {
            items: outcome.items,
            executed_mode: outcome.executed_mode,
            degraded: outcome.degraded || downgraded,
            cache_hit,
        };

        self.lock_log().record(QueryLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            query: request.text.clone(),
            executed_mode: response.executed_mode,
            latency: started.elapsed(),
            result_count: response.items.len(),
            cache_hit,
            degraded: response.degraded,
            timestamp_epoch_ms: Utc::now().timestamp_millis(),
        });

        response
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, QueryLog> {
        match self.query_log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
