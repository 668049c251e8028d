use std::collections::HashSet;

use proptest::prelude::*;
use pylon_retrieval::fusion;

fn arb_ranked_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-f]{1,2}", 0..12)
        .prop_map(|set| set.into_iter().collect())
}

// ── Fusion output is a strict deterministic ranking ─────────────────────

proptest! {
    #[test]
    fn fused_ranking_is_strictly_ordered(
        lists in prop::collection::vec(arb_ranked_list(), 0..4),
        k in 1u32..200,
    ) {
        let fused = fusion::fuse(&lists, k);
        for pair in fused.windows(2) {
            prop_assert!(
                pair[0].1 > pair[1].1
                    || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0),
                "not strictly ordered: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

proptest! {
    #[test]
    fn fused_ids_are_unique_and_come_from_inputs(
        lists in prop::collection::vec(arb_ranked_list(), 0..4),
    ) {
        let fused = fusion::fuse(&lists, 60);

        let mut seen = HashSet::new();
        for (id, score) in &fused {
            prop_assert!(seen.insert(id.clone()), "duplicate id {id}");
            prop_assert!(*score > 0.0);
        }

        let input_ids: HashSet<&String> = lists.iter().flatten().collect();
        prop_assert_eq!(fused.len(), input_ids.len());
    }
}

proptest! {
    #[test]
    fn duplicated_lists_preserve_order(
        list in arb_ranked_list(),
    ) {
        prop_assume!(list.len() >= 2);
        // Duplicate the full list: every id appears twice, scores double,
        // relative order is preserved.
        let once = fusion::fuse(&[list.clone()], 60);
        let twice = fusion::fuse(&[list.clone(), list], 60);
        let order_once: Vec<&String> = once.iter().map(|(id, _)| id).collect();
        let order_twice: Vec<&String> = twice.iter().map(|(id, _)| id).collect();
        prop_assert_eq!(order_once, order_twice);
    }
}
