use chrono::Utc;
use proptest::prelude::*;
use pylon_admission::{Admission, RateLimiter};
use pylon_core::config::{LimiterConfig, QuotaPolicy};

// ── Never over-admit within any window ──────────────────────────────────

proptest! {
    #[test]
    fn admissions_within_window_never_exceed_quota(
        max_requests in 1u32..20,
        offsets in prop::collection::vec(0i64..50, 1..80),
    ) {
        let limiter = RateLimiter::new(LimiterConfig::default());
        let policy = QuotaPolicy::new(max_requests, 60);
        let start = Utc::now();

        let mut offsets = offsets;
        offsets.sort_unstable();

        let mut admitted = 0u32;
        for offset in offsets {
            let at = start + chrono::Duration::seconds(offset);
            if limiter.check_at("caller", policy, at).is_allowed() {
                admitted += 1;
            }
        }
        // All offsets fall inside one 60s window, so total admissions
        // are bounded by the quota.
        prop_assert!(admitted <= max_requests);
    }
}

// ── Denials always carry a positive, bounded retry-after ────────────────

proptest! {
    #[test]
    fn retry_after_is_positive_and_within_window(
        max_requests in 1u32..10,
        window_secs in 1u64..120,
        extra in 1u32..30,
    ) {
        let limiter = RateLimiter::new(LimiterConfig::default());
        let policy = QuotaPolicy::new(max_requests, window_secs);
        let now = Utc::now();

        for _ in 0..(max_requests + extra) {
            if let Admission::Denied { retry_after } =
                limiter.check_at("caller", policy, now)
            {
                prop_assert!(retry_after.as_nanos() > 0);
                prop_assert!(retry_after.as_secs() <= window_secs);
            }
        }
        // The quota was exceeded, so at least one denial occurred.
        prop_assert!(
            matches!(
                limiter.check_at("caller", policy, now),
                Admission::Denied { .. }
            ),
            "quota exceeded, so at least one denial must occur"
        );
    }
}
