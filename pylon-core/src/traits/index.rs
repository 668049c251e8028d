use std::collections::BTreeMap;

use crate::errors::GatewayResult;

/// External nearest-neighbor index over corpus item embeddings.
pub trait IVectorIndex: Send + Sync {
    /// Return up to `top_k` `(item_id, cosine_distance)` pairs, nearest
    /// first. Filters constrain candidates by item labels.
    fn nearest(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: &BTreeMap<String, String>,
    ) -> GatewayResult<Vec<(String, f64)>>;

    /// Human-readable index name.
    fn name(&self) -> &str;
}
