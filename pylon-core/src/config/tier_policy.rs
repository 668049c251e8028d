use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::{GatewayError, GatewayResult};
use crate::models::SearchMode;
use crate::tier::Tier;

/// Per-tier quota: a maximum request count over a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl QuotaPolicy {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }

    /// Admitted requests per second, for cross-tier comparison.
    fn rate(&self) -> f64 {
        self.max_requests as f64 / self.window_secs.max(1) as f64
    }
}

/// Tier policy table: quotas and permitted search modes, by data not code.
///
/// New tiers or mode grants are a config change; the orchestrator never
/// branches on specific tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPolicyConfig {
    pub quotas: BTreeMap<Tier, QuotaPolicy>,
    pub permitted_modes: BTreeMap<Tier, Vec<SearchMode>>,
}

impl Default for TierPolicyConfig {
    fn default() -> Self {
        let w = defaults::DEFAULT_WINDOW_SECS;
        let quotas = BTreeMap::from([
            (Tier::Anonymous, QuotaPolicy::new(10, w)),
            (Tier::Free, QuotaPolicy::new(60, w)),
            (Tier::Dev, QuotaPolicy::new(300, w)),
            (Tier::Pro, QuotaPolicy::new(1_200, w)),
            (Tier::Team, QuotaPolicy::new(6_000, w)),
        ]);
        let basic = vec![SearchMode::Keyword, SearchMode::Auto];
        let full = SearchMode::ALL.to_vec();
        let permitted_modes = BTreeMap::from([
            (Tier::Anonymous, basic.clone()),
            (Tier::Free, basic),
            (Tier::Dev, full.clone()),
            (Tier::Pro, full.clone()),
            (Tier::Team, full),
        ]);
        Self {
            quotas,
            permitted_modes,
        }
    }
}

impl TierPolicyConfig {
    /// Quota for a tier. Tiers missing from the table inherit the
    /// anonymous quota, the most restrictive sensible fallback.
    pub fn quota(&self, tier: Tier) -> QuotaPolicy {
        self.quotas
            .get(&tier)
            .or_else(|| self.quotas.get(&Tier::Anonymous))
            .copied()
            .unwrap_or(QuotaPolicy::new(10, defaults::DEFAULT_WINDOW_SECS))
    }

    /// Modes a tier may invoke. Missing entries fall back to keyword-only.
    pub fn permitted(&self, tier: Tier) -> Vec<SearchMode> {
        self.permitted_modes
            .get(&tier)
            .cloned()
            .unwrap_or_else(|| vec![SearchMode::Keyword])
    }

    /// Enforce the quota invariant: higher tiers admit at least the rate
    /// of lower tiers, and every tier permits at least one mode.
    pub fn validate(&self) -> GatewayResult<()> {
        for pair in Tier::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            if self.quota(higher).rate() < self.quota(lower).rate() {
                return Err(GatewayError::Config {
                    reason: format!(
                        "tier {higher} quota is below tier {lower} quota"
                    ),
                });
            }
        }
        for tier in Tier::ALL {
            if self.permitted(tier).is_empty() {
                return Err(GatewayError::Config {
                    reason: format!("tier {tier} permits no search modes"),
                });
            }
        }
        Ok(())
    }
}
