//! Credential → tier resolution.
//!
//! `resolve` is total: absent, malformed, unknown, and revoked
//! credentials all map to `Tier::Anonymous`, never to an error.
//! Key issuance and revocation are administrative operations off the
//! hot path; revocation flips a flag rather than removing the record.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use pylon_core::constants::KEY_PREFIX;
use pylon_core::Tier;

/// One issued credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Operator-facing label, e.g. the integrating product's name.
    pub name: String,
    pub tier: Tier,
    pub active: bool,
    pub created: DateTime<Utc>,
}

/// A key listing entry with the credential masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskedKey {
    pub key_prefix: String,
    pub name: String,
    pub tier: Tier,
    pub active: bool,
}

/// The tier registry: a small, infrequently-updated credential map.
pub struct TierRegistry {
    keys: DashMap<String, KeyRecord>,
}

impl TierRegistry {
    pub fn new() -> Self {
        Self {
            keys: DashMap::new(),
        }
    }

    /// Resolve a raw credential to a tier. Never fails.
    pub fn resolve(&self, identity: Option<&str>) -> Tier {
        let Some(raw) = identity else {
            return Tier::Anonymous;
        };
        let token = raw.trim();
        if !token.starts_with(KEY_PREFIX) {
            return Tier::Anonymous;
        }
        match self.keys.get(token) {
            Some(record) if record.active => record.tier,
            _ => Tier::Anonymous,
        }
    }

    /// Issue a new credential for `name` at `tier`. Returns the key.
    pub fn issue(&self, name: impl Into<String>, tier: Tier) -> String {
        let key = format!("{KEY_PREFIX}{}", uuid::Uuid::new_v4().simple());
        let name = name.into();
        info!(name = %name, %tier, "issued credential");
        self.keys.insert(
            key.clone(),
            KeyRecord {
                name,
                tier,
                active: true,
                created: Utc::now(),
            },
        );
        key
    }

    /// Revoke a credential. Returns false if the key was never issued.
    pub fn revoke(&self, key: &str) -> bool {
        match self.keys.get_mut(key) {
            Some(mut record) => {
                record.active = false;
                info!(name = %record.name, "revoked credential");
                true
            }
            None => false,
        }
    }

    /// Replace the whole credential map (configuration reload).
    pub fn reload(&self, keys: impl IntoIterator<Item = (String, KeyRecord)>) {
        self.keys.clear();
        for (key, record) in keys {
            self.keys.insert(key, record);
        }
        info!(count = self.keys.len(), "credential map reloaded");
    }

    /// List all keys with the credential masked to its prefix.
    pub fn masked_keys(&self) -> Vec<MaskedKey> {
        self.keys
            .iter()
            .map(|entry| MaskedKey {
                key_prefix: format!("{}…", &entry.key()[..entry.key().len().min(16)]),
                name: entry.value().name.clone(),
                tier: entry.value().tier,
                active: entry.value().active,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for TierRegistry {
    fn default() -> Self {
        Self::new()
    }
}
