//! Item metadata and the operations on it.
//!
//! Records are created on first touch and never deleted; archival is a
//! flag. Content itself lives in the external corpus store; this crate
//! only holds recency metadata and the derived score.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pylon_core::config::DecayConfig;
use pylon_core::errors::{GatewayError, GatewayResult};

use crate::formula;

/// Staleness metadata for one knowledge item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: String,
    /// Fingerprint of the content at last verification, when known.
    pub content_fingerprint: Option<String>,
    pub last_accessed: DateTime<Utc>,
    pub last_verified: DateTime<Utc>,
    pub archived: bool,
}

/// One row of the operator-facing staleness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayReportEntry {
    pub item_id: String,
    pub decay_score: f64,
    pub last_accessed: DateTime<Utc>,
    pub last_verified: DateTime<Utc>,
    pub archived: bool,
}

/// Tracks staleness for every item retrieval has ever surfaced.
pub struct DecayTracker {
    items: DashMap<String, ItemRecord>,
    config: DecayConfig,
}

impl DecayTracker {
    pub fn new(config: DecayConfig) -> Self {
        Self {
            items: DashMap::new(),
            config,
        }
    }

    /// Record a successful retrieval of an item at the current time.
    pub fn touch(&self, item_id: &str) {
        self.touch_at(item_id, Utc::now());
    }

    /// Record a retrieval at an explicit instant. First touch registers
    /// the item with both timestamps set to `now`.
    pub fn touch_at(&self, item_id: &str, now: DateTime<Utc>) {
        let mut record = self
            .items
            .entry(item_id.to_string())
            .or_insert_with(|| ItemRecord {
                item_id: item_id.to_string(),
                content_fingerprint: None,
                last_accessed: now,
                last_verified: now,
                archived: false,
            });
        record.last_accessed = now;
    }

    /// Administrative refresh: resets the item's decay to zero.
    pub fn mark_verified(&self, item_id: &str) {
        self.mark_verified_at(item_id, Utc::now());
    }

    pub fn mark_verified_at(&self, item_id: &str, now: DateTime<Utc>) {
        self.mark_verified_with_fingerprint_at(item_id, None, now);
    }

    /// Verify and record the content fingerprint observed at that time.
    pub fn mark_verified_with_fingerprint_at(
        &self,
        item_id: &str,
        fingerprint: Option<String>,
        now: DateTime<Utc>,
    ) {
        let mut record = self
            .items
            .entry(item_id.to_string())
            .or_insert_with(|| ItemRecord {
                item_id: item_id.to_string(),
                content_fingerprint: None,
                last_accessed: now,
                last_verified: now,
                archived: false,
            });
        record.last_accessed = now;
        record.last_verified = now;
        if fingerprint.is_some() {
            record.content_fingerprint = fingerprint;
        }
        debug!(item_id, "item verified");
    }

    /// Flag an item as archived. Idempotent: archiving an archived item
    /// is a no-op. Returns false for items never seen.
    pub fn archive(&self, item_id: &str) -> bool {
        match self.items.get_mut(item_id) {
            Some(mut record) => {
                if !record.archived {
                    record.archived = true;
                    info!(item_id, "item archived");
                }
                true
            }
            None => false,
        }
    }

    /// Current staleness score for an item, or `None` if never seen.
    pub fn decay_score(&self, item_id: &str) -> Option<f64> {
        self.decay_score_at(item_id, Utc::now())
    }

    pub fn decay_score_at(&self, item_id: &str, now: DateTime<Utc>) -> Option<f64> {
        self.items
            .get(item_id)
            .map(|record| formula::staleness(&record, now, self.config.half_life_days))
    }

    /// The staleness report: up to `limit` items, most stale first,
    /// ties broken by item id for determinism.
    pub fn report(&self, limit: usize) -> Vec<DecayReportEntry> {
        self.report_at(limit, Utc::now())
    }

    pub fn report_at(&self, limit: usize, now: DateTime<Utc>) -> Vec<DecayReportEntry> {
        let mut entries: Vec<DecayReportEntry> = self
            .items
            .iter()
            .map(|record| DecayReportEntry {
                item_id: record.item_id.clone(),
                decay_score: formula::staleness(&record, now, self.config.half_life_days),
                last_accessed: record.last_accessed,
                last_verified: record.last_verified,
                archived: record.archived,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.decay_score
                .partial_cmp(&a.decay_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        entries.truncate(limit);
        entries
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of archived items.
    pub fn archived_count(&self) -> usize {
        self.items.iter().filter(|r| r.archived).count()
    }

    /// Drop all records. Test/teardown hook.
    pub fn reset(&self) {
        self.items.clear();
    }

    // ── Snapshot persistence (configuration choice) ──────────────────

    pub fn snapshot(&self) -> BTreeMap<String, ItemRecord> {
        self.items
            .iter()
            .map(|record| (record.key().clone(), record.value().clone()))
            .collect()
    }

    pub fn restore(&self, snapshot: BTreeMap<String, ItemRecord>) {
        self.items.clear();
        for (item_id, record) in snapshot {
            self.items.insert(item_id, record);
        }
    }

    pub fn save_to(&self, path: &Path) -> GatewayResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json).map_err(|e| GatewayError::Internal {
            reason: format!("writing decay snapshot {}: {e}", path.display()),
        })
    }

    pub fn load_from(&self, path: &Path) -> GatewayResult<()> {
        let json = std::fs::read_to_string(path).map_err(|e| GatewayError::Internal {
            reason: format!("reading decay snapshot {}: {e}", path.display()),
        })?;
        let snapshot: BTreeMap<String, ItemRecord> = serde_json::from_str(&json)?;
        self.restore(snapshot);
        Ok(())
    }
}
