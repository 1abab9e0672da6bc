//! Persistence - save records and the gateway that writes them.
//!
//! The gateway owns the most recent save rather than keeping it in a global,
//! so whoever needs "last save" is handed the gateway.

mod store;

pub use store::*;

use episode_rules::{NodeId, ResourceState};
use serde::{Deserialize, Serialize};

use crate::config::PersistenceConfig;

/// Current save format version.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Errors raised by stores and the gateway.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("i/o error on save key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// A persisted run position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub episode_id: String,

    /// Empty once the run has finished.
    pub node_id: NodeId,

    pub resources: ResourceState,

    pub version: u32,
}

impl SaveRecord {
    /// Create a record in the current format.
    pub fn new(episode_id: impl Into<String>, node_id: NodeId, resources: ResourceState) -> Self {
        Self {
            episode_id: episode_id.into(),
            node_id,
            resources,
            version: SAVE_FORMAT_VERSION,
        }
    }

    /// Whether the record marks a finished run.
    pub fn is_finished(&self) -> bool {
        self.node_id.is_terminal()
    }
}

/// Writes the auto slot after every transition and loads saved runs.
#[derive(Debug)]
pub struct PersistenceGateway<S> {
    store: S,
    key_prefix: String,
    auto_slot: u32,
    last_save: Option<SaveRecord>,
}

impl<S: SaveStore> PersistenceGateway<S> {
    /// Create a gateway with default key layout.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &PersistenceConfig::default())
    }

    /// Create a gateway using the configured key prefix and auto slot.
    pub fn with_config(store: S, config: &PersistenceConfig) -> Self {
        Self {
            store,
            key_prefix: config.key_prefix.clone(),
            auto_slot: config.auto_slot,
            last_save: None,
        }
    }

    fn slot_key(&self, slot: u32) -> String {
        format!("{}{}", self.key_prefix, slot)
    }

    /// Overwrite the auto slot with `record` and remember it as the last save.
    pub fn auto_save(&mut self, record: &SaveRecord) -> Result<(), PersistenceError> {
        self.last_save = Some(record.clone());
        let key = self.slot_key(self.auto_slot);
        let json = serde_json::to_string(record)?;
        self.store.put(&key, json)?;
        tracing::trace!(key = key.as_str(), node = %record.node_id, "auto-saved");
        Ok(())
    }

    /// Load whatever record is in `slot`.
    pub fn load(&self, slot: u32) -> Result<Option<SaveRecord>, PersistenceError> {
        let Some(raw) = self.store.get(&self.slot_key(slot))? else {
            return Ok(None);
        };

        let record: SaveRecord = serde_json::from_str(&raw)?;
        if record.version != SAVE_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: record.version,
                expected: SAVE_FORMAT_VERSION,
            });
        }
        Ok(Some(record))
    }

    /// Load the record in `slot` only if it belongs to `episode_id`.
    pub fn load_for_episode(
        &self,
        slot: u32,
        episode_id: &str,
    ) -> Result<Option<SaveRecord>, PersistenceError> {
        Ok(self
            .load(slot)?
            .filter(|record| record.episode_id == episode_id))
    }

    /// The slot written by [`Self::auto_save`].
    pub fn auto_slot(&self) -> u32 {
        self.auto_slot
    }

    /// The most recent record saved through this gateway.
    pub fn last_save(&self) -> Option<&SaveRecord> {
        self.last_save.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
