//! Shared fakes for integration tests: a counting embedding provider, an
//! in-memory vector index, and a small static corpus. All deterministic,
//! with failure injection switches where tests need to break things.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use pylon_core::constants::{DEP_EMBEDDING_PROVIDER, DEP_VECTOR_INDEX};
use pylon_core::errors::{GatewayError, GatewayResult};
use pylon_core::models::CorpusDocument;
use pylon_core::traits::{ICorpusStore, IEmbeddingProvider, IVectorIndex};

/// Deterministic hash-bucket embedding: shared terms produce nearby
/// vectors, so similarity behaves sensibly in tests.
pub fn toy_embedding(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dims];
    for term in text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| s.len() >= 2)
    {
        let term = term.to_lowercase();
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in term.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        vector[(hash as usize) % dims] += 1.0;
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Embedding provider that counts calls and can be switched to fail.
pub struct CountingProvider {
    dimensions: usize,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingProvider {
    pub fn new(dimensions: usize) -> Arc<Self> {
        Arc::new(Self {
            dimensions,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl IEmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> GatewayResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(toy_embedding(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "counting-provider"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// In-memory cosine-distance index over embedded corpus documents.
pub struct InMemoryVectorIndex {
    entries: Vec<(String, Vec<f32>, BTreeMap<String, String>)>,
    failing: AtomicBool,
}

impl InMemoryVectorIndex {
    /// Embed every document with [`toy_embedding`] at `dims`.
    pub fn from_documents(documents: &[CorpusDocument], dims: usize) -> Arc<Self> {
        let entries = documents
            .iter()
            .map(|doc| {
                (
                    doc.item_id.clone(),
                    toy_embedding(&doc.text, dims),
                    doc.labels.clone(),
                )
            })
            .collect();
        Arc::new(Self {
            entries,
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl IVectorIndex for InMemoryVectorIndex {
    fn nearest(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: &BTreeMap<String, String>,
    ) -> GatewayResult<Vec<(String, f64)>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_VECTOR_INDEX.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let mut scored: Vec<(String, f64)> = self
            .entries
            .iter()
            .filter(|(_, _, labels)| {
                filters
                    .iter()
                    .all(|(k, v)| labels.get(k).is_some_and(|l| l == v))
            })
            .map(|(item_id, embedding, _)| {
                let dot: f32 = embedding.iter().zip(vector).map(|(a, b)| a * b).sum();
                (item_id.clone(), 1.0 - dot as f64)
            })
            .collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    fn name(&self) -> &str {
        "in-memory-index"
    }
}

/// Small static corpus used across integration tests.
pub struct StaticCorpus {
    documents: Vec<CorpusDocument>,
}

impl StaticCorpus {
    pub fn sample() -> Arc<Self> {
        Arc::new(Self {
            documents: vec![
                CorpusDocument::new(
                    "kb-caching",
                    "caching strategies for read-heavy services and cache invalidation",
                )
                .with_label("topic", "caching"),
                CorpusDocument::new(
                    "kb-event-sourcing",
                    "event sourcing stores state as an append-only log of events",
                )
                .with_label("topic", "architecture"),
                CorpusDocument::new(
                    "kb-circuit-breaker",
                    "circuit breakers isolate failing dependencies behind trip thresholds",
                )
                .with_label("topic", "resilience"),
                CorpusDocument::new(
                    "kb-rate-limiting",
                    "sliding window rate limiting smooths bursts across a rolling window",
                )
                .with_label("topic", "resilience"),
                CorpusDocument::new(
                    "kb-sharding",
                    "sharding partitions data across nodes by key ranges or hashes",
                )
                .with_label("topic", "storage"),
            ],
        })
    }
}

impl ICorpusStore for StaticCorpus {
    fn documents(&self) -> Vec<CorpusDocument> {
        self.documents.clone()
    }

    fn snippet(&self, item_id: &str) -> Option<String> {
        self.documents
            .iter()
            .find(|d| d.item_id == item_id)
            .map(|d| d.text.chars().take(120).collect())
    }
}
