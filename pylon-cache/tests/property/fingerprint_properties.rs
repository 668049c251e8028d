use std::collections::BTreeMap;

use proptest::prelude::*;
use pylon_cache::Fingerprint;
use pylon_core::models::SearchMode;

fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..8)
}

fn arb_mode() -> impl Strategy<Value = SearchMode> {
    prop_oneof![
        Just(SearchMode::Keyword),
        Just(SearchMode::Semantic),
        Just(SearchMode::Hybrid),
        Just(SearchMode::Auto),
    ]
}

// ── Logically identical queries always collide ──────────────────────────

proptest! {
    #[test]
    fn case_and_whitespace_never_split_the_key(
        words in arb_words(),
        mode in arb_mode(),
        pads in prop::collection::vec(1usize..4, 1..8),
    ) {
        let plain = words.join(" ");

        // Rebuild the same query with noisy spacing and uppercased words.
        let mut noisy = String::from("  ");
        for (i, word) in words.iter().enumerate() {
            let pad = pads.get(i % pads.len()).copied().unwrap_or(1);
            noisy.push_str(&word.to_uppercase());
            noisy.push_str(&" ".repeat(pad));
        }

        let filters = BTreeMap::new();
        let a = Fingerprint::compute(&plain, mode, &filters);
        let b = Fingerprint::compute(&noisy, mode, &filters);
        prop_assert_eq!(a, b);
    }
}

// ── Mode and filters are part of the key ────────────────────────────────

proptest! {
    #[test]
    fn different_filters_split_the_key(
        words in arb_words(),
        key in "[a-z]{1,6}",
        value in "[a-z]{1,6}",
    ) {
        let text = words.join(" ");
        let empty = BTreeMap::new();
        let mut with_filter = BTreeMap::new();
        with_filter.insert(key, value);

        let bare = Fingerprint::compute(&text, SearchMode::Hybrid, &empty);
        let filtered = Fingerprint::compute(&text, SearchMode::Hybrid, &with_filter);
        prop_assert_ne!(bare, filtered);
    }
}

proptest! {
    #[test]
    fn fingerprints_are_stable(words in arb_words(), mode in arb_mode()) {
        let text = words.join(" ");
        let filters = BTreeMap::new();
        let a = Fingerprint::compute(&text, mode, &filters);
        let b = Fingerprint::compute(&text, mode, &filters);
        prop_assert_eq!(a.as_str(), b.as_str());
    }
}
