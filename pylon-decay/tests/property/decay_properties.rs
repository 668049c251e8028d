use chrono::{Duration, Utc};
use proptest::prelude::*;
use pylon_core::config::DecayConfig;
use pylon_decay::DecayTracker;

fn tracker(half_life_days: f64) -> DecayTracker {
    DecayTracker::new(DecayConfig {
        half_life_days,
        snapshot_path: None,
    })
}

// ── Bounded [0, 1) ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn score_is_bounded(
        hours in 0i64..100_000,
        half_life_days in 1.0f64..365.0,
    ) {
        let tracker = tracker(half_life_days);
        let start = Utc::now();
        tracker.touch_at("item", start);

        let score = tracker
            .decay_score_at("item", start + Duration::hours(hours))
            .unwrap();
        prop_assert!((0.0..1.0).contains(&score), "out of bounds: {}", score);
    }
}

// ── Monotone non-decreasing between verifications ───────────────────────

proptest! {
    #[test]
    fn monotone_without_intervention(
        mut offsets in prop::collection::vec(0i64..10_000, 2..20),
        half_life_days in 1.0f64..365.0,
    ) {
        let tracker = tracker(half_life_days);
        let start = Utc::now();
        tracker.mark_verified_at("item", start);

        offsets.sort_unstable();
        let mut prev = -1.0;
        for offset in offsets {
            let score = tracker
                .decay_score_at("item", start + Duration::hours(offset))
                .unwrap();
            prop_assert!(
                score >= prev,
                "score decreased without touch/verify: {} < {}",
                score,
                prev
            );
            prev = score;
        }
    }
}

// ── Verification always resets to zero ──────────────────────────────────

proptest! {
    #[test]
    fn verify_resets_to_zero(
        age_days in 0i64..1_000,
        half_life_days in 1.0f64..365.0,
    ) {
        let tracker = tracker(half_life_days);
        let start = Utc::now();
        tracker.touch_at("item", start);

        let later = start + Duration::days(age_days);
        tracker.mark_verified_at("item", later);
        prop_assert_eq!(tracker.decay_score_at("item", later), Some(0.0));
    }
}

// ── Shorter half-life decays faster ─────────────────────────────────────

proptest! {
    #[test]
    fn shorter_half_life_is_staler(days in 1i64..365) {
        let fast = tracker(7.0);
        let slow = tracker(90.0);
        let start = Utc::now();
        fast.touch_at("item", start);
        slow.touch_at("item", start);

        let at = start + Duration::days(days);
        let fast_score = fast.decay_score_at("item", at).unwrap();
        let slow_score = slow.decay_score_at("item", at).unwrap();
        prop_assert!(fast_score > slow_score);
    }
}
