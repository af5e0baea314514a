//! The record store: versioned local storage for the portal's collections.
//!
//! All operations are async and self-initializing: the first one to run
//! opens (or creates) the database, and concurrent first calls share that
//! single open instead of racing. Secondary indexes are maintained inside
//! the same atomic batch as the record write, so an index entry can never
//! point at a record state that was not also persisted.

use crate::config::RocksDbSettings;
use crate::memory::InMemoryBackend;
use crate::open::open_database;
use crate::storage::{Operation, Partition, StorageBackend, StorageBackendAsync};
use brokerbase_commons::document::Document;
use brokerbase_commons::error::{Result, StoreError};
use brokerbase_commons::ids::RecordId;
use brokerbase_commons::keys;
use brokerbase_commons::schema::{self, Collection, IndexSpec};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Handle to the portal database.
///
/// Cheap to construct; the underlying database is opened lazily on first
/// use. Clone-free sharing is expected via `Arc<RecordStore>`.
pub struct RecordStore {
    path: PathBuf,
    settings: RocksDbSettings,
    backend: OnceCell<Arc<dyn StorageBackend>>,
    // Serializes the fetch-then-batch section of save/delete. The batch
    // alone is atomic, but index maintenance reads the previous record
    // first; two unserialized writers for the same id could both read the
    // same "previous" and leave a stale index entry behind.
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Store over an on-disk database at `path`, opened on first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_settings(path, RocksDbSettings::default())
    }

    /// Same as [`open`](Self::open) with explicit engine settings.
    pub fn with_settings(path: impl Into<PathBuf>, settings: RocksDbSettings) -> Self {
        Self {
            path: path.into(),
            settings,
            backend: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store over an already-opened backend.
    pub fn from_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            path: PathBuf::new(),
            settings: RocksDbSettings::default(),
            backend: OnceCell::new_with(Some(backend)),
            write_lock: Mutex::new(()),
        }
    }

    /// Volatile store for tests, pre-provisioned with the full schema.
    pub fn in_memory() -> Self {
        let backend = InMemoryBackend::with_partitions(&schema::all_partitions());
        Self::from_backend(Arc::new(backend))
    }

    /// The backend, opening the database on first call. Concurrent callers
    /// block on the same open; exactly one open ever runs.
    async fn backend(&self) -> Result<&Arc<dyn StorageBackend>> {
        self.backend
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let settings = self.settings.clone();
                tokio::task::spawn_blocking(move || open_database(&path, &settings))
                    .await
                    .map_err(|e| StoreError::OpenFailed(format!("open task failed: {e}")))?
            })
            .await
    }

    /// Inserts or replaces a record.
    ///
    /// The stored document is returned: the store assigns an `id` when the
    /// record carries none and refreshes `timestamp` on every save, and the
    /// caller needs both. A save with an existing id replaces that record
    /// wholesale, including its index entries.
    pub async fn save(&self, collection: Collection, record: serde_json::Value) -> Result<Document> {
        let backend = self.backend().await?;

        let mut doc = Document::from_value(record)?;
        let id = match doc.id() {
            Some(id) => RecordId::new(id),
            None => RecordId::generate(),
        };
        doc.set_id(&id);
        doc.set_timestamp(chrono::Utc::now().timestamp_millis());

        let bytes = serde_json::to_vec(&doc)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        let record_partition = Partition::new(collection.name());
        let record_key = keys::record_key(id.as_str());

        let mut operations = Vec::new();

        // Held across the previous-record fetch and the batch so concurrent
        // same-id writers see each other's index entries.
        let _write = self.write_lock.lock().await;

        // Replacing a record may change indexed values, so stale entries are
        // deleted in the same batch that writes the new ones.
        let indexes = collection.indexes();
        if !indexes.is_empty() {
            if let Some(previous) = self.fetch(backend, collection, id.as_str()).await? {
                operations.extend(stale_index_deletes(indexes, &previous, id.as_str()));
            }
            operations.extend(index_puts(indexes, &doc, id.as_str()));
        }

        operations.push(Operation::Put {
            partition: record_partition,
            key: record_key,
            value: bytes,
        });

        backend.batch_async(operations).await?;
        log::debug!("saved record {id} in {}", collection.name());
        Ok(doc)
    }

    /// Fetches a record by id. `Ok(None)` when no such record exists.
    pub async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let backend = self.backend().await?;
        self.fetch(backend, collection, id).await
    }

    /// All records of a collection, in id order.
    pub async fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let backend = self.backend().await?;
        let entries = backend
            .scan_async(&Partition::new(collection.name()), None, None)
            .await?;
        entries
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// Exact-match lookup over a secondary index. Returns every record whose
    /// indexed field equals `value`; an empty vec when nothing matches.
    pub async fn search_by_index(
        &self,
        collection: Collection,
        index_name: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        let backend = self.backend().await?;
        let spec = collection.index(index_name).ok_or_else(|| {
            StoreError::CollectionMissing(format!("{}.{index_name}", collection.name()))
        })?;

        let prefix = keys::index_scan_prefix(value);
        let entries = backend
            .scan_async(&Partition::new(spec.partition), Some(prefix), None)
            .await?;

        let mut records = Vec::with_capacity(entries.len());
        for (_, id_bytes) in entries {
            let id = String::from_utf8(id_bytes).map_err(|e| {
                StoreError::TransactionFailed(format!("corrupt index entry: {e}"))
            })?;
            match self.fetch(backend, collection, &id).await? {
                Some(doc) => records.push(doc),
                // An entry without its record means a batch was lost
                // mid-write by the engine; surface it but keep serving.
                None => log::warn!(
                    "dangling index entry {index_name}={value} -> {id} in {}",
                    collection.name()
                ),
            }
        }
        Ok(records)
    }

    /// Deletes a record and its index entries. Deleting an absent id is a
    /// no-op, not an error.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let backend = self.backend().await?;
        let _write = self.write_lock.lock().await;

        let Some(existing) = self.fetch(backend, collection, id).await? else {
            log::debug!("delete of absent record {id} in {}", collection.name());
            return Ok(());
        };

        let mut operations = stale_index_deletes(collection.indexes(), &existing, id);
        operations.push(Operation::Delete {
            partition: Partition::new(collection.name()),
            key: keys::record_key(id),
        });

        backend.batch_async(operations).await?;
        log::debug!("deleted record {id} from {}", collection.name());
        Ok(())
    }

    async fn fetch(
        &self,
        backend: &Arc<dyn StorageBackend>,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>> {
        let bytes = backend
            .get_async(&Partition::new(collection.name()), &keys::record_key(id))
            .await?;
        bytes.as_deref().map(decode).transpose()
    }
}

fn decode(bytes: &[u8]) -> Result<Document> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::InvalidRecord(format!("stored record is not valid JSON: {e}")))
}

/// Index puts for every indexed field the document carries as a string.
/// Records missing an indexed field (or holding a non-string there) are
/// stored but simply not findable through that index.
fn index_puts(indexes: &[IndexSpec], doc: &Document, id: &str) -> Vec<Operation> {
    indexes
        .iter()
        .filter_map(|spec| {
            doc.field_str(spec.field).map(|value| Operation::Put {
                partition: Partition::new(spec.partition),
                key: keys::index_entry_key(value, id),
                value: id.as_bytes().to_vec(),
            })
        })
        .collect()
}

/// Deletes for the index entries a previously stored document produced.
fn stale_index_deletes(indexes: &[IndexSpec], previous: &Document, id: &str) -> Vec<Operation> {
    indexes
        .iter()
        .filter_map(|spec| {
            previous.field_str(spec.field).map(|value| Operation::Delete {
                partition: Partition::new(spec.partition),
                key: keys::index_entry_key(value, id),
            })
        })
        .collect()
}
