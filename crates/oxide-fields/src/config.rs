//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default key under which the field snapshot is stored.
pub const DEFAULT_STORAGE_KEY: &str = "builder_fields_v1";

/// How a [`FieldStore`](crate::store::FieldStore) is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Whether to load and save snapshots.
    pub persist: bool,
    /// Snapshot key.
    pub storage_key: String,
    /// Directory holding snapshot files.
    pub storage_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist: false,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: PathBuf::from("."),
        }
    }
}

impl StoreConfig {
    /// Creates the default, non-persistent configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables snapshot persistence.
    #[must_use]
    pub fn persist(mut self) -> Self {
        self.persist = true;
        self
    }

    /// Sets the snapshot key.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the snapshot directory.
    #[must_use]
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}
