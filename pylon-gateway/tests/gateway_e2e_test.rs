use std::sync::Arc;

use chrono::{Duration, Utc};
use pylon_admission::TierRegistry;
use pylon_core::config::{GatewayConfig, QuotaPolicy, TierPolicyConfig};
use pylon_core::errors::GatewayError;
use pylon_core::models::{HealthStatus, SearchMode};
use pylon_core::traits::{ICorpusStore, IEmbeddingProvider};
use pylon_core::{QueryRequest, Tier};
use pylon_gateway::Gateway;
use test_fixtures::{CountingProvider, InMemoryVectorIndex, StaticCorpus};

const DIMS: usize = 32;

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config
        .tiers
        .quotas
        .insert(Tier::Anonymous, QuotaPolicy::new(5, 60));
    config
}

fn gateway_with(config: GatewayConfig) -> (Gateway, Arc<CountingProvider>, String) {
    let registry = Arc::new(TierRegistry::new());
    let pro_key = registry.issue("e2e-suite", Tier::Pro);

    let corpus = StaticCorpus::sample();
    let provider = CountingProvider::new(DIMS);
    let index = InMemoryVectorIndex::from_documents(&corpus.documents(), DIMS);

    let provider_dyn: Arc<dyn IEmbeddingProvider> = Arc::clone(&provider) as Arc<dyn IEmbeddingProvider>;
    let gateway = Gateway::new(config, registry, provider_dyn, index, corpus).unwrap();
    (gateway, provider, pro_key)
}

fn gateway() -> (Gateway, Arc<CountingProvider>, String) {
    gateway_with(test_config())
}

// ── Anonymous quota: 5 per minute, 6th denied with retry-after ──────────

#[test]
fn anonymous_caller_hits_quota_on_sixth_query() {
    let (gateway, _, _) = gateway();
    let start = Utc::now();

    for i in 0..5 {
        let request = QueryRequest::new("caching strategies", SearchMode::Keyword)
            .with_origin("session-1");
        let response = gateway
            .query_at(request, start + Duration::seconds(i))
            .unwrap();
        assert!(!response.items.is_empty(), "query {i} should return results");
    }

    let sixth = QueryRequest::new("caching strategies", SearchMode::Keyword)
        .with_origin("session-1");
    match gateway.query_at(sixth, start + Duration::seconds(10)) {
        Err(GatewayError::RateLimited { retry_after }) => {
            assert!(retry_after.as_millis() > 0, "retry-after must be positive");
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[test]
fn denied_request_never_reaches_the_engine() {
    let mut config = test_config();
    // Pin every tier to five requests so the pro caller trips quickly.
    for tier in Tier::ALL {
        config.tiers.quotas.insert(tier, QuotaPolicy::new(5, 60));
    }
    let (gateway, provider, pro_key) = gateway_with(config);
    let now = Utc::now();

    for _ in 0..5 {
        gateway
            .query_at(
                QueryRequest::new("event sourcing", SearchMode::Semantic)
                    .with_identity(&pro_key),
                now,
            )
            .unwrap();
    }
    let calls_before = provider.calls();

    let denied = gateway.query_at(
        QueryRequest::new("sharding by key ranges", SearchMode::Semantic)
            .with_identity(&pro_key),
        now,
    );
    assert!(matches!(denied, Err(GatewayError::RateLimited { .. })));
    assert_eq!(
        provider.calls(),
        calls_before,
        "a denied request must not touch the provider"
    );
}

#[test]
fn anonymous_sessions_do_not_starve_each_other() {
    let (gateway, _, _) = gateway();
    let now = Utc::now();

    for _ in 0..5 {
        gateway
            .query_at(
                QueryRequest::new("caching strategies", SearchMode::Keyword)
                    .with_origin("session-a"),
                now,
            )
            .unwrap();
    }
    // session-a is exhausted; session-b is untouched.
    let from_b = gateway.query_at(
        QueryRequest::new("caching strategies", SearchMode::Keyword).with_origin("session-b"),
        now,
    );
    assert!(from_b.is_ok());
}

// ── Semantic cache: identical query within TTL costs zero embeddings ────

#[test]
fn second_identical_semantic_query_is_free_and_identical() {
    let (gateway, provider, pro_key) = gateway();
    let now = Utc::now();

    let request = || {
        QueryRequest::new("event sourcing", SearchMode::Semantic).with_identity(&pro_key)
    };

    let first = gateway.query_at(request(), now).unwrap();
    assert_eq!(first.executed_mode, SearchMode::Semantic);
    assert!(!first.cache_hit);
    assert_eq!(provider.calls(), 1);

    let second = gateway
        .query_at(request(), now + Duration::seconds(30))
        .unwrap();
    assert!(second.cache_hit);
    assert_eq!(provider.calls(), 1, "cache hit must not invoke the provider");
    assert_eq!(second.items, first.items, "ranked results must be identical");
}

#[test]
fn normalized_query_variants_share_a_cache_entry() {
    let (gateway, provider, pro_key) = gateway();
    let now = Utc::now();

    gateway
        .query_at(
            QueryRequest::new("Event Sourcing", SearchMode::Semantic).with_identity(&pro_key),
            now,
        )
        .unwrap();
    let second = gateway
        .query_at(
            QueryRequest::new("  event   sourcing ", SearchMode::Semantic)
                .with_identity(&pro_key),
            now,
        )
        .unwrap();
    assert!(second.cache_hit);
    assert_eq!(provider.calls(), 1);
}

#[test]
fn expired_cache_entry_reinvokes_the_engine() {
    let (gateway, provider, pro_key) = gateway();
    let now = Utc::now();
    let ttl_secs = test_config().cache.ttl_secs as i64;

    let request = || {
        QueryRequest::new("event sourcing", SearchMode::Semantic).with_identity(&pro_key)
    };
    gateway.query_at(request(), now).unwrap();

    let after_ttl = gateway
        .query_at(request(), now + Duration::seconds(ttl_secs))
        .unwrap();
    assert!(!after_ttl.cache_hit);
    assert_eq!(provider.calls(), 2);
}

// ── Tier policy: downgrade, not rejection ───────────────────────────────

#[test]
fn anonymous_semantic_request_is_downgraded_and_flagged() {
    let (gateway, provider, _) = gateway();
    let now = Utc::now();

    let response = gateway
        .query_at(
            QueryRequest::new("event sourcing", SearchMode::Semantic).with_origin("s"),
            now,
        )
        .unwrap();
    assert_ne!(response.executed_mode, SearchMode::Semantic);
    assert!(response.degraded, "policy downgrade must be visible");
    assert_eq!(provider.calls(), 0, "keyword sufficed for a strong match");
}

#[test]
fn reloaded_policy_takes_effect() {
    let (gateway, _, _) = gateway();
    let now = Utc::now();

    let mut table = TierPolicyConfig::default();
    table
        .permitted_modes
        .insert(Tier::Anonymous, SearchMode::ALL.to_vec());
    gateway.reload_tiers(table).unwrap();

    let response = gateway
        .query_at(
            QueryRequest::new("event sourcing", SearchMode::Semantic).with_origin("s"),
            now,
        )
        .unwrap();
    assert_eq!(response.executed_mode, SearchMode::Semantic);
    assert!(!response.degraded);
}

#[test]
fn invalid_policy_reload_is_rejected() {
    let (gateway, _, _) = gateway();
    let mut table = TierPolicyConfig::default();
    table.quotas.insert(Tier::Team, QuotaPolicy::new(1, 60));
    assert!(gateway.reload_tiers(table).is_err());
}

// ── Degradation: broken provider never becomes a caller error ───────────

#[test]
fn provider_outage_serves_keyword_with_flag() {
    let (gateway, provider, pro_key) = gateway();
    provider.set_failing(true);
    let now = Utc::now();

    let response = gateway
        .query_at(
            QueryRequest::new("caching strategies", SearchMode::Hybrid)
                .with_identity(&pro_key),
            now,
        )
        .unwrap();
    assert_eq!(response.executed_mode, SearchMode::Keyword);
    assert!(response.degraded);
    assert!(!response.items.is_empty());
}

#[test]
fn health_reflects_an_opened_breaker() {
    let (gateway, provider, pro_key) = gateway();
    provider.set_failing(true);
    let now = Utc::now();

    assert_eq!(
        gateway.health_report().overall_status,
        HealthStatus::Healthy
    );

    // Distinct queries avoid the cache; default threshold is 3 failures.
    for i in 0..3 {
        gateway
            .query_at(
                QueryRequest::new(format!("unique probe {i}"), SearchMode::Semantic)
                    .with_identity(&pro_key),
                now,
            )
            .unwrap();
    }

    let report = gateway.health_report();
    assert_eq!(report.overall_status, HealthStatus::Degraded);
    let embedding = report
        .subsystems
        .iter()
        .find(|s| s.name == "embedding-provider")
        .expect("embedding-provider subsystem present");
    assert_eq!(embedding.status, HealthStatus::Unhealthy);
}

// ── Decay wiring: touches on hit and miss paths, admin operations ───────

#[test]
fn retrieval_touches_returned_items() {
    let (gateway, _, _) = gateway();
    let now = Utc::now();

    let response = gateway
        .query_at(
            QueryRequest::new("caching strategies", SearchMode::Keyword).with_origin("s"),
            now,
        )
        .unwrap();
    assert!(!response.items.is_empty());

    let report = gateway.decay_report_at(10, now);
    let reported: Vec<&str> = report.iter().map(|e| e.item_id.as_str()).collect();
    for item in &response.items {
        assert!(reported.contains(&item.item_id.as_str()));
    }
}

#[test]
fn cache_hits_also_touch_items() {
    let (gateway, _, pro_key) = gateway();
    let start = Utc::now();

    let request = || {
        QueryRequest::new("event sourcing", SearchMode::Semantic).with_identity(&pro_key)
    };
    gateway.query_at(request(), start).unwrap();

    // Cache hit 100 seconds later refreshes last-accessed.
    let later = start + Duration::seconds(100);
    let hit = gateway.query_at(request(), later).unwrap();
    assert!(hit.cache_hit);

    let report = gateway.decay_report_at(10, later);
    let entry = report
        .iter()
        .find(|e| e.item_id == hit.items[0].item_id)
        .unwrap();
    assert_eq!(entry.last_accessed, later);
}

#[test]
fn verify_and_archive_via_admin_surface() {
    let (gateway, _, _) = gateway();
    let start = Utc::now();

    gateway
        .query_at(
            QueryRequest::new("caching strategies", SearchMode::Keyword).with_origin("s"),
            start,
        )
        .unwrap();

    let later = start + Duration::days(10);
    let stale = gateway.decay_report_at(10, later);
    assert!(stale[0].decay_score > 0.0);

    gateway.mark_verified_at(&stale[0].item_id, later);
    let refreshed = gateway.decay_report_at(10, later);
    let entry = refreshed
        .iter()
        .find(|e| e.item_id == stale[0].item_id)
        .unwrap();
    assert_eq!(entry.decay_score, 0.0);

    assert!(gateway.archive(&entry.item_id));
    assert!(gateway.archive(&entry.item_id), "archival is idempotent");
}

// ── Query log ───────────────────────────────────────────────────────────

#[test]
fn query_log_records_served_queries() {
    let (gateway, _, _) = gateway();
    let now = Utc::now();

    for text in ["caching strategies", "event sourcing"] {
        gateway
            .query_at(
                QueryRequest::new(text, SearchMode::Keyword).with_origin("s"),
                now,
            )
            .unwrap();
    }

    let recent = gateway.recent_queries(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].query, "event sourcing");
    assert!(!recent[0].cache_hit);
}

// ── Snapshot persistence through the gateway ────────────────────────────

#[test]
fn snapshots_survive_a_gateway_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.breaker.snapshot_path = Some(dir.path().join("breaker.json"));
    config.decay.snapshot_path = Some(dir.path().join("decay.json"));

    let (gateway, provider, pro_key) = gateway_with(config.clone());
    provider.set_failing(true);
    let now = Utc::now();
    for i in 0..3 {
        gateway
            .query_at(
                QueryRequest::new(format!("probe {i}"), SearchMode::Semantic)
                    .with_identity(&pro_key),
                now,
            )
            .unwrap();
    }
    gateway
        .query_at(
            QueryRequest::new("caching strategies", SearchMode::Keyword).with_origin("s"),
            now,
        )
        .unwrap();
    gateway.save_snapshots().unwrap();

    // A fresh gateway over the same config restores both.
    let (restarted, _, _) = gateway_with(config);
    let report = restarted.health_report();
    assert_eq!(report.overall_status, HealthStatus::Degraded);
    assert!(report.metrics.tracked_items > 0);
}
