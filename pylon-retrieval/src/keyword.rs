//! In-process lexical index.
//!
//! Term-overlap scoring with idf weighting: a document's score is the
//! idf-weighted fraction of query terms it contains, in [0, 1]. Rare
//! terms count for more than common ones. No external dependency: this
//! is the path that keeps working when everything else is down.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use pylon_core::models::CorpusDocument;

struct IndexedDoc {
    item_id: String,
    labels: BTreeMap<String, String>,
    terms: HashSet<String>,
}

/// Inverted lexical index over the corpus.
pub struct KeywordIndex {
    docs: Vec<IndexedDoc>,
    doc_freq: HashMap<String, usize>,
}

impl KeywordIndex {
    /// Build the index from the corpus store's documents.
    pub fn build(documents: &[CorpusDocument]) -> Self {
        let mut docs = Vec::with_capacity(documents.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let terms: HashSet<String> = tokenize(&document.text).into_iter().collect();
            for term in &terms {
                *doc_freq.entry(term.clone()).or_default() += 1;
            }
            docs.push(IndexedDoc {
                item_id: document.item_id.clone(),
                labels: document.labels.clone(),
                terms,
            });
        }

        debug!(
            documents = docs.len(),
            terms = doc_freq.len(),
            "keyword index built"
        );
        Self { docs, doc_freq }
    }

    /// Ranked `(item_id, score)` pairs for a query, best first, ties
    /// broken ascending by item id. Empty when nothing matches.
    pub fn search(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        top_k: usize,
    ) -> Vec<(String, f64)> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return Vec::new();
        }

        let total_weight: f64 = query_terms.iter().map(|t| self.idf(t)).sum();
        if total_weight <= 0.0 {
            return Vec::new();
        }

        let mut scored: Vec<(String, f64)> = self
            .docs
            .iter()
            .filter(|doc| matches_filters(&doc.labels, filters))
            .filter_map(|doc| {
                let matched: f64 = query_terms
                    .iter()
                    .filter(|t| doc.terms.contains(*t))
                    .map(|t| self.idf(t))
                    .sum();
                if matched > 0.0 {
                    Some((doc.item_id.clone(), matched / total_weight))
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);
        scored
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Smoothed inverse document frequency. Terms seen nowhere get the
    /// maximum weight, so unmatched rare terms pull scores down hard.
    fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        (1.0 + n / (1.0 + df)).ln()
    }
}

fn matches_filters(labels: &BTreeMap<String, String>, filters: &BTreeMap<String, String>) -> bool {
    filters
        .iter()
        .all(|(k, v)| labels.get(k).is_some_and(|l| l == v))
}

/// Tokenize into lowercase alphanumeric terms, dropping one-character
/// fragments.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| s.len() >= 2)
        .map(|s| s.to_lowercase())
        .collect()
}
