//! Snapshot storage for field collections.
//!
//! A backend stores one serialized snapshot per key. The store decides what
//! to do with failures; backends just report them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;

/// Reads and writes serialized snapshots by key.
pub trait SnapshotBackend: Send + Sync {
    /// Returns the snapshot stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `snapshot` under `key`, replacing any previous one.
    fn save(&self, key: &str, snapshot: &str) -> Result<()>;
}

/// Stores each snapshot as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotBackend {
    dir: PathBuf,
}

impl FileSnapshotBackend {
    /// Creates a backend rooted at `dir`. The directory is created on first
    /// save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the file a key is stored in.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotBackend for FileSnapshotBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), snapshot)?;
        Ok(())
    }
}

/// Keeps snapshots in memory. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotBackend {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySnapshotBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores a raw snapshot under `key`.
    pub fn insert(&self, key: impl Into<String>, snapshot: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), snapshot.into());
    }
}

impl SnapshotBackend for MemorySnapshotBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<()> {
        self.insert(key, snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSnapshotBackend::new(dir.path().join("nested"));

        assert_eq!(backend.load("builder").unwrap(), None);
        backend.save("builder", "[]").unwrap();
        assert_eq!(backend.load("builder").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/builder.json").exists());
    }

    #[test]
    fn test_memory_backend_clones_share_entries() {
        let backend = MemorySnapshotBackend::new();
        let other = backend.clone();
        other.save("k", "v").unwrap();
        assert_eq!(backend.load("k").unwrap().as_deref(), Some("v"));
    }
}
