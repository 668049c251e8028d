//! The gateway error taxonomy.
//!
//! `InvalidQuery` and `RateLimited` are the caller's problem; provider
//! variants are recovered locally via breaker-gated fallback and only
//! surface when every fallback path has failed; `Internal` is ours.

use std::time::Duration;

/// Top-level error type for the Pylon gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("rate limited: retry after {}ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    #[error("dependency {dependency} unavailable: {reason}")]
    ProviderUnavailable { dependency: String, reason: String },

    #[error("dependency {dependency} timed out after {}ms", timeout.as_millis())]
    ProviderTimeout { dependency: String, timeout: Duration },

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl GatewayError {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Whether this error counts as a dependency failure for the breaker.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::ProviderTimeout { .. }
        )
    }
}

/// Convenience alias used across all Pylon crates.
pub type GatewayResult<T> = Result<T, GatewayError>;
