//! The tier/mode permission table.
//!
//! Pure data lookup: which modes a tier may invoke lives in config, so
//! adding a tier or granting a mode never touches orchestrator code.
//! A request for a disallowed mode is downgraded to the tier's best
//! permitted mode and flagged, in line with degradation-over-failure.

use std::sync::RwLock;

use tracing::debug;

use pylon_core::config::{QuotaPolicy, TierPolicyConfig};
use pylon_core::models::SearchMode;
use pylon_core::Tier;

/// The outcome of checking a requested mode against the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    /// The mode that will actually be requested from the engine.
    pub mode: SearchMode,
    /// True when the caller asked for more than their tier permits.
    pub downgraded: bool,
}

/// Reloadable wrapper around the tier policy table.
pub struct ModePolicy {
    table: RwLock<TierPolicyConfig>,
}

impl ModePolicy {
    pub fn new(table: TierPolicyConfig) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    /// Quota for a tier, from the current table.
    pub fn quota(&self, tier: Tier) -> QuotaPolicy {
        self.read().quota(tier)
    }

    /// Resolve the mode to execute for a tier's request.
    ///
    /// Permitted requests pass through. Otherwise the fallback chain is
    /// `auto`, then `keyword`, then whatever the tier permits first.
    pub fn effective_mode(&self, tier: Tier, requested: SearchMode) -> ModeDecision {
        let table = self.read();
        let permitted = table.permitted(tier);
        if permitted.contains(&requested) {
            return ModeDecision {
                mode: requested,
                downgraded: false,
            };
        }

        let fallback = [SearchMode::Auto, SearchMode::Keyword]
            .into_iter()
            .find(|m| permitted.contains(m))
            .or_else(|| permitted.first().copied())
            .unwrap_or(SearchMode::Keyword);

        debug!(%tier, %requested, executed = %fallback, "mode downgraded by tier policy");
        ModeDecision {
            mode: fallback,
            downgraded: true,
        }
    }

    /// Replace the table (administrative reload).
    pub fn reload(&self, table: TierPolicyConfig) {
        match self.table.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
    }

    fn read(&self) -> impl std::ops::Deref<Target = TierPolicyConfig> + '_ {
        match self.table.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ModePolicy {
        ModePolicy::new(TierPolicyConfig::default())
    }

    #[test]
    fn permitted_mode_passes_through() {
        let policy = policy();
        let decision = policy.effective_mode(Tier::Pro, SearchMode::Semantic);
        assert_eq!(decision.mode, SearchMode::Semantic);
        assert!(!decision.downgraded);
    }

    #[test]
    fn anonymous_semantic_downgrades_to_auto() {
        let policy = policy();
        let decision = policy.effective_mode(Tier::Anonymous, SearchMode::Semantic);
        assert_eq!(decision.mode, SearchMode::Auto);
        assert!(decision.downgraded);
    }

    #[test]
    fn anonymous_hybrid_downgrades_too() {
        let policy = policy();
        let decision = policy.effective_mode(Tier::Free, SearchMode::Hybrid);
        assert_eq!(decision.mode, SearchMode::Auto);
        assert!(decision.downgraded);
    }

    #[test]
    fn reload_changes_decisions() {
        let policy = policy();
        let mut table = TierPolicyConfig::default();
        table
            .permitted_modes
            .insert(Tier::Free, vec![SearchMode::Keyword]);
        policy.reload(table);

        let decision = policy.effective_mode(Tier::Free, SearchMode::Auto);
        assert_eq!(decision.mode, SearchMode::Keyword);
        assert!(decision.downgraded);
    }
}
