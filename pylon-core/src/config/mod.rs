//! Gateway configuration: one aggregate struct, per-subsystem sections,
//! every default named in [`defaults`]. Loadable from TOML.

pub mod breaker_config;
pub mod cache_config;
pub mod decay_config;
pub mod defaults;
pub mod limiter_config;
pub mod retrieval_config;
pub mod tier_policy;

use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, GatewayResult};

pub use breaker_config::BreakerConfig;
pub use cache_config::CacheConfig;
pub use decay_config::DecayConfig;
pub use limiter_config::LimiterConfig;
pub use retrieval_config::RetrievalConfig;
pub use tier_policy::{QuotaPolicy, TierPolicyConfig};

/// Aggregate configuration for the whole gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub tiers: TierPolicyConfig,
    pub limiter: LimiterConfig,
    pub breaker: BreakerConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
    pub decay: DecayConfig,
}

impl GatewayConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> GatewayResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| GatewayError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a TOML file.
    pub fn load(path: &std::path::Path) -> GatewayResult<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| GatewayError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&input)
    }

    /// Cross-field validation beyond what serde can express.
    pub fn validate(&self) -> GatewayResult<()> {
        self.tiers.validate()?;
        if self.breaker.failure_threshold == 0 {
            return Err(GatewayError::Config {
                reason: "breaker.failure_threshold must be positive".to_string(),
            });
        }
        if self.breaker.backoff_multiplier < 1.0 {
            return Err(GatewayError::Config {
                reason: "breaker.backoff_multiplier must be >= 1.0".to_string(),
            });
        }
        if self.retrieval.max_top_k == 0 {
            return Err(GatewayError::Config {
                reason: "retrieval.max_top_k must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.retrieval.relevance_floor) {
            return Err(GatewayError::Config {
                reason: "retrieval.relevance_floor must be within [0, 1]".to_string(),
            });
        }
        if self.decay.half_life_days <= 0.0 {
            return Err(GatewayError::Config {
                reason: "decay.half_life_days must be positive".to_string(),
            });
        }
        Ok(())
    }
}
