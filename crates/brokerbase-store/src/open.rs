//! Database provisioning: open (or create) the on-disk store with every
//! partition the schema requires, and verify the persisted schema version.
//!
//! Provisioning is additive. Opening an older database creates whatever
//! partitions have been added since it was written; nothing is dropped. A
//! database stamped with a *newer* schema version than this binary knows is
//! refused rather than risk misreading its layout.

use crate::config::RocksDbSettings;
use crate::rocksdb_backend::{Db, RocksDbBackend};
use crate::storage::{Partition, StorageBackend};
use brokerbase_commons::error::{Result, StoreError};
use brokerbase_commons::schema::{self, META_PARTITION, SCHEMA_VERSION, SCHEMA_VERSION_KEY};
use rocksdb::{BlockBasedOptions, Cache, ColumnFamilyDescriptor, Options};
use std::path::Path;
use std::sync::Arc;

/// Opens the database at `path`, creating it and any missing partitions.
pub fn open_database(path: &Path, settings: &RocksDbSettings) -> Result<Arc<dyn StorageBackend>> {
    let options = build_options(settings);

    // Column families present on disk from a previous run; a fresh database
    // has none (list_cf fails), so start from just the default family.
    let mut cf_names = Db::list_cf(&Options::default(), path)
        .unwrap_or_else(|_| vec!["default".to_string()]);
    for name in schema::all_partitions() {
        if !cf_names.iter().any(|existing| existing == name) {
            cf_names.push(name.to_string());
        }
    }

    // One block cache shared across all column families.
    let cache = Cache::new_lru_cache(settings.block_cache_size);
    let descriptors: Vec<ColumnFamilyDescriptor> = cf_names
        .iter()
        .map(|name| ColumnFamilyDescriptor::new(name.as_str(), cf_options(settings, &cache)))
        .collect();

    let db = Db::open_cf_descriptors(&options, path, descriptors)
        .map_err(|e| StoreError::OpenFailed(format!("{}: {e}", path.display())))?;

    let backend = RocksDbBackend::new(Arc::new(db), path.to_path_buf());
    verify_schema_version(&backend)?;

    log::info!(
        "opened database {} at {} (schema v{})",
        schema::DB_NAME,
        path.display(),
        SCHEMA_VERSION
    );
    Ok(Arc::new(backend))
}

fn build_options(settings: &RocksDbSettings) -> Options {
    let mut options = Options::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    options.set_max_open_files(settings.max_open_files);
    options
}

fn cf_options(settings: &RocksDbSettings, cache: &Cache) -> Options {
    let mut options = Options::default();
    options.set_write_buffer_size(settings.write_buffer_size);
    options.set_max_write_buffer_number(settings.max_write_buffers);

    let mut block = BlockBasedOptions::default();
    block.set_block_cache(cache);
    options.set_block_based_table_factory(&block);
    options
}

/// Compares the persisted schema version against this binary's and stamps
/// the current version. Additive provisioning means older databases are
/// upgraded in place; newer ones fail the open.
fn verify_schema_version(backend: &RocksDbBackend) -> Result<()> {
    let meta = Partition::new(META_PARTITION);
    let stored = backend
        .get(&meta, SCHEMA_VERSION_KEY)?
        .and_then(|bytes| bytes.try_into().ok().map(u32::from_be_bytes));

    if let Some(version) = stored {
        if version > SCHEMA_VERSION {
            return Err(StoreError::OpenFailed(format!(
                "database schema v{version} is newer than supported v{SCHEMA_VERSION}"
            )));
        }
        if version < SCHEMA_VERSION {
            log::info!("upgrading database schema v{version} -> v{SCHEMA_VERSION}");
        }
    }

    backend.put(&meta, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_be_bytes())
}

#[cfg(test)]
pub(crate) fn open_for_tests() -> anyhow::Result<(tempfile::TempDir, Arc<dyn StorageBackend>)> {
    let dir = tempfile::tempdir()?;
    let backend = open_database(dir.path(), &RocksDbSettings::default())?;
    Ok((dir, backend))
}
