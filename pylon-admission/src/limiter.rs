//! Sliding-window rate limiter.
//!
//! One usage window per caller key, pruned to the active window on every
//! check. The prune + compare + record sequence runs under the map's
//! exclusive per-key guard, so two concurrent checks for the last slot
//! admit exactly one caller.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use pylon_core::config::{LimiterConfig, QuotaPolicy};
use pylon_core::constants::ANONYMOUS_LOCAL_POOL;

/// The limiter's verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    /// Denied; retry once the oldest retained request exits the window.
    /// Always a positive duration.
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

#[derive(Debug, Default)]
struct Window {
    timestamps: VecDeque<DateTime<Utc>>,
}

/// Per-caller sliding-window rate limiter. Memory-only: windows are lost
/// on restart, which at worst briefly over-admits after a crash.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    config: LimiterConfig,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Derive the usage-window key for a caller.
    ///
    /// Credentialed callers get their own bucket. Anonymous callers pool
    /// per transport origin (so one anonymous caller cannot starve
    /// another), falling back to a single local pool when the transport
    /// supplies no origin.
    pub fn pool_key(&self, identity: Option<&str>, origin: Option<&str>) -> String {
        match identity.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => match origin {
                Some(o) if self.config.pool_anonymous_by_origin => format!("anon:{o}"),
                _ => ANONYMOUS_LOCAL_POOL.to_string(),
            },
        }
    }

    /// Check and record against the caller's quota at the current time.
    pub fn check(&self, key: &str, policy: QuotaPolicy) -> Admission {
        self.check_at(key, policy, Utc::now())
    }

    /// Check and record at an explicit instant. Atomic per key.
    pub fn check_at(&self, key: &str, policy: QuotaPolicy, now: DateTime<Utc>) -> Admission {
        let window = chrono::Duration::seconds(policy.window_secs as i64);
        let cutoff = now - window;

        let mut entry = self.windows.entry(key.to_string()).or_default();
        while entry
            .timestamps
            .front()
            .is_some_and(|t| *t <= cutoff)
        {
            entry.timestamps.pop_front();
        }

        let used = entry.timestamps.len() as u32;
        if used < policy.max_requests {
            entry.timestamps.push_back(now);
            Admission::Allowed {
                remaining: policy.max_requests - used - 1,
            }
        } else {
            let oldest = entry.timestamps.front().copied().unwrap_or(now);
            // oldest > cutoff after pruning, so this is strictly positive.
            let retry_after = (oldest + window - now)
                .to_std()
                .unwrap_or(Duration::from_millis(1))
                .max(Duration::from_millis(1));
            debug!(key, used, quota = policy.max_requests, "request denied");
            Admission::Denied { retry_after }
        }
    }

    /// Drop windows with no activity within the idle grace period.
    /// Returns the number of windows collected.
    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let grace = chrono::Duration::seconds(self.config.idle_grace_secs as i64);
        let before = self.windows.len();
        self.windows
            .retain(|_, w| w.timestamps.back().is_some_and(|t| *t + grace > now));
        before - self.windows.len()
    }

    /// Number of caller keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
