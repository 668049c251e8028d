//! Reciprocal Rank Fusion: score = Σ 1/(k + rank).
//!
//! Merges ranked lists from different retrieval methods without
//! normalizing their incompatible score scales. `k` smooths the
//! influence of top ranks; ranks are 1-based.

use std::collections::HashMap;

/// Fuse ranked id lists into a single `(item_id, rrf_score)` ranking,
/// best first, ties broken ascending by item id.
pub fn fuse(ranked_lists: &[Vec<String>], k: u32) -> Vec<(String, f64)> {
    let mut scores: HashMap<String, f64> = HashMap::new();

    for list in ranked_lists {
        for (rank, item_id) in list.iter().enumerate() {
            let rrf = 1.0 / (k as f64 + rank as f64 + 1.0);
            *scores.entry(item_id.clone()).or_default() += rrf;
        }
    }

    let mut fused: Vec<(String, f64)> = scores.into_iter().collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    fused
}
