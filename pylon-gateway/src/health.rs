//! Health report assembly.
//!
//! Overall status is driven by what the gateway can still serve: open
//! or half-open breakers mean degraded (keyword still works); only an
//! empty keyword index makes the gateway unhealthy, because then no
//! fallback path can answer at all.

use pylon_breaker::{BreakerState, CircuitBreaker};
use pylon_cache::SemanticCache;
use pylon_core::models::{GatewayMetrics, HealthReport, HealthStatus, SubsystemHealth};
use pylon_decay::DecayTracker;

pub(crate) fn build_report(
    breaker: &CircuitBreaker,
    cache: &SemanticCache,
    decay: &DecayTracker,
    indexed_documents: usize,
) -> HealthReport {
    let subsystems: Vec<SubsystemHealth> = breaker
        .health()
        .into_iter()
        .map(|status| SubsystemHealth {
            name: status.dependency,
            status: match status.state {
                BreakerState::Closed => HealthStatus::Healthy,
                BreakerState::HalfOpen => HealthStatus::Degraded,
                BreakerState::Open => HealthStatus::Unhealthy,
            },
            message: (status.consecutive_failures > 0)
                .then(|| format!("{} consecutive failures", status.consecutive_failures)),
        })
        .collect();

    let overall_status = if indexed_documents == 0 {
        HealthStatus::Unhealthy
    } else if subsystems
        .iter()
        .any(|s| s.status != HealthStatus::Healthy)
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    HealthReport {
        overall_status,
        subsystems,
        metrics: GatewayMetrics {
            tracked_items: decay.len(),
            archived_items: decay.archived_count(),
            cache_entries: cache.entry_count(),
            cache_hit_rate: cache.hit_rate(),
        },
    }
}
