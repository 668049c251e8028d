use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A retrievable unit of the corpus as seen by this gateway.
///
/// Content is owned by the external corpus store; the gateway only reads
/// it to build the keyword index and to fingerprint for staleness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub item_id: String,
    pub text: String,
    /// Labels matched against query filters, e.g. `topic`, `source`.
    pub labels: BTreeMap<String, String>,
}

impl CorpusDocument {
    pub fn new(item_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            text: text.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Content fingerprint used by the decay tracker to detect drift
    /// between what was indexed and what the store now holds.
    pub fn content_fingerprint(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }

    /// Whether this document satisfies every filter constraint.
    pub fn matches_filters(&self, filters: &BTreeMap<String, String>) -> bool {
        filters
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|l| l == v))
    }
}
