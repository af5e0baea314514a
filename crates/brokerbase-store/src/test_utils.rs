//! Helpers for tests that need a real on-disk store.

use crate::config::RocksDbSettings;
use crate::record_store::RecordStore;
use tempfile::TempDir;

/// A record store over a temporary directory, removed on drop.
pub struct TestStore {
    // Held so the directory outlives the store.
    _dir: TempDir,
    pub store: RecordStore,
}

impl TestStore {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = RecordStore::with_settings(dir.path(), RocksDbSettings::default());
        Ok(Self { _dir: dir, store })
    }

    /// The directory path, for tests that reopen the database.
    pub fn path(&self) -> &std::path::Path {
        self._dir.path()
    }
}
