//! The result cache itself.
//!
//! moka provides the capacity bound and a wall-clock TTL backstop;
//! expiry on the lookup path is checked lazily against the caller's
//! clock so tests drive it deterministically with simulated time.
//! A hit returns the stored outcome without touching any dependency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use tracing::debug;

use pylon_core::config::CacheConfig;
use pylon_core::models::SearchOutcome;

use crate::fingerprint::Fingerprint;

struct Entry {
    outcome: SearchOutcome,
    created_at: DateTime<Utc>,
    access_count: AtomicU64,
}

/// Fingerprint-keyed semantic result cache.
pub struct SemanticCache {
    entries: Cache<Fingerprint, Arc<Entry>>,
    ttl: chrono::Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SemanticCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self {
            entries,
            ttl: chrono::Duration::seconds(config.ttl_secs as i64),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a fingerprint at the current time.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<SearchOutcome> {
        self.get_at(fingerprint, Utc::now())
    }

    /// Look up a fingerprint at an explicit instant. An entry at or past
    /// its TTL is invalidated and reported as a miss.
    pub fn get_at(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Option<SearchOutcome> {
        match self.entries.get(fingerprint) {
            Some(entry) => {
                if now - entry.created_at >= self.ttl {
                    debug!(fingerprint = %fingerprint, "entry expired, lazily evicting");
                    self.entries.invalidate(fingerprint);
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    None
                } else {
                    entry.access_count.fetch_add(1, Ordering::Relaxed);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Some(entry.outcome.clone())
                }
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a result under its fingerprint at the current time.
    pub fn put(&self, fingerprint: Fingerprint, outcome: SearchOutcome) {
        self.put_at(fingerprint, outcome, Utc::now());
    }

    pub fn put_at(&self, fingerprint: Fingerprint, outcome: SearchOutcome, now: DateTime<Utc>) {
        self.entries.insert(
            fingerprint,
            Arc::new(Entry {
                outcome,
                created_at: now,
                access_count: AtomicU64::new(0),
            }),
        );
    }

    /// How many times an entry has been served.
    pub fn access_count(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.entries
            .get(fingerprint)
            .map(|e| e.access_count.load(Ordering::Relaxed))
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups served from the cache; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Drop all entries and counters. Test/teardown hook.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_core::models::{ScoredItem, SearchMode};
    use std::collections::BTreeMap;

    fn outcome(id: &str) -> SearchOutcome {
        SearchOutcome::new(
            vec![ScoredItem {
                item_id: id.to_string(),
                score: 0.9,
                snippet: String::new(),
            }],
            SearchMode::Semantic,
        )
    }

    fn fp(text: &str) -> Fingerprint {
        Fingerprint::compute(text, SearchMode::Semantic, &BTreeMap::new())
    }

    fn cache(ttl_secs: u64, max_entries: u64) -> SemanticCache {
        SemanticCache::new(&CacheConfig {
            ttl_secs,
            max_entries,
        })
    }

    #[test]
    fn put_then_get_returns_stored_outcome() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);
        let hit = cache.get_at(&fp("q"), now).unwrap();
        assert_eq!(hit.items[0].item_id, "item-1");
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);

        let at_ttl = now + chrono::Duration::seconds(300);
        assert!(cache.get_at(&fp("q"), at_ttl).is_none());
        // The lazy eviction removed it for good.
        assert!(cache.get_at(&fp("q"), now).is_none());
    }

    #[test]
    fn entry_just_under_ttl_still_hits() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);
        let almost = now + chrono::Duration::seconds(299);
        assert!(cache.get_at(&fp("q"), almost).is_some());
    }

    #[test]
    fn access_count_increments_on_hits() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);
        cache.get_at(&fp("q"), now);
        cache.get_at(&fp("q"), now);
        assert_eq!(cache.access_count(&fp("q")), Some(2));
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = cache(300, 8);
        let now = Utc::now();
        for i in 0..64 {
            cache.put_at(fp(&format!("query {i}")), outcome("item"), now);
        }
        assert!(cache.entry_count() <= 8);
    }

    #[test]
    fn hit_rate_tracks_lookups() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);
        cache.get_at(&fp("q"), now);
        cache.get_at(&fp("other"), now);
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn clear_resets_everything() {
        let cache = cache(300, 100);
        let now = Utc::now();
        cache.put_at(fp("q"), outcome("item-1"), now);
        cache.get_at(&fp("q"), now);
        cache.clear();
        assert!(cache.get_at(&fp("q"), now).is_none());
        assert_eq!(cache.hits(), 0);
    }
}
