//! Deterministic query fingerprinting.
//!
//! Two logically identical queries must collide: text is trimmed,
//! lower-cased, and whitespace-collapsed; filters contribute in sorted
//! key order; the mode tags the digest.

use std::collections::BTreeMap;
use std::fmt;

use pylon_core::models::SearchMode;

/// A normalized cache key over (query text, search mode, filters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a query.
    pub fn compute(text: &str, mode: SearchMode, filters: &BTreeMap<String, String>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(normalize(text).as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(mode.as_str().as_bytes());
        for (key, value) in filters {
            hasher.update(&[0x1f]);
            hasher.update(key.as_bytes());
            hasher.update(&[0x1e]);
            hasher.update(value.as_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filters() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn whitespace_and_case_collide() {
        let a = Fingerprint::compute("Event Sourcing", SearchMode::Semantic, &no_filters());
        let b = Fingerprint::compute("  event   sourcing ", SearchMode::Semantic, &no_filters());
        assert_eq!(a, b);
    }

    #[test]
    fn mode_distinguishes() {
        let a = Fingerprint::compute("event sourcing", SearchMode::Semantic, &no_filters());
        let b = Fingerprint::compute("event sourcing", SearchMode::Keyword, &no_filters());
        assert_ne!(a, b);
    }

    #[test]
    fn filters_distinguish_but_order_cannot() {
        let mut one = BTreeMap::new();
        one.insert("topic".to_string(), "architecture".to_string());
        one.insert("source".to_string(), "handbook".to_string());

        // BTreeMap iteration is sorted regardless of insertion order, so
        // building the same map differently yields the same fingerprint.
        let mut two = BTreeMap::new();
        two.insert("source".to_string(), "handbook".to_string());
        two.insert("topic".to_string(), "architecture".to_string());

        let a = Fingerprint::compute("q", SearchMode::Hybrid, &one);
        let b = Fingerprint::compute("q", SearchMode::Hybrid, &two);
        assert_eq!(a, b);

        let c = Fingerprint::compute("q", SearchMode::Hybrid, &no_filters());
        assert_ne!(a, c);
    }

    #[test]
    fn key_value_boundaries_are_unambiguous() {
        let mut ab = BTreeMap::new();
        ab.insert("a".to_string(), "bc".to_string());
        let mut abc = BTreeMap::new();
        abc.insert("ab".to_string(), "c".to_string());
        let one = Fingerprint::compute("q", SearchMode::Keyword, &ab);
        let two = Fingerprint::compute("q", SearchMode::Keyword, &abc);
        assert_ne!(one, two);
    }
}
