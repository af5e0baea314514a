//! In-memory storage backend for tests.
//!
//! Keeps each partition as an ordered map so scans see the same key order
//! RocksDB would produce. Not for production use: nothing is persisted.

use crate::storage::{KvIterator, Operation, Partition, StorageBackend};
use brokerbase_commons::error::{Result, StoreError};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

type PartitionData = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile backend backed by `BTreeMap`s behind one `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    partitions: RwLock<HashMap<String, PartitionData>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with the given partitions pre-created, matching what
    /// `open_database` provisions on disk.
    pub fn with_partitions(names: &[&str]) -> Self {
        let mut map = HashMap::new();
        for name in names {
            map.insert(name.to_string(), BTreeMap::new());
        }
        Self {
            partitions: RwLock::new(map),
        }
    }

    fn read_lock(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, PartitionData>>> {
        self.partitions
            .read()
            .map_err(|e| StoreError::TransactionFailed(format!("lock poisoned: {e}")))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, PartitionData>>> {
        self.partitions
            .write()
            .map_err(|e| StoreError::TransactionFailed(format!("lock poisoned: {e}")))
    }
}

fn missing(partition: &Partition) -> StoreError {
    StoreError::CollectionMissing(partition.name().to_string())
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let guard = self.read_lock()?;
        let data = guard.get(partition.name()).ok_or_else(|| missing(partition))?;
        Ok(data.get(key).cloned())
    }

    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        let mut guard = self.write_lock()?;
        let data = guard
            .get_mut(partition.name())
            .ok_or_else(|| missing(partition))?;
        data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        let mut guard = self.write_lock()?;
        let data = guard
            .get_mut(partition.name())
            .ok_or_else(|| missing(partition))?;
        data.remove(key);
        Ok(())
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<()> {
        let mut guard = self.write_lock()?;

        // Validate every target partition before touching anything so a
        // failed batch leaves no partial writes behind.
        for op in &operations {
            let partition = match op {
                Operation::Put { partition, .. } => partition,
                Operation::Delete { partition, .. } => partition,
            };
            if !guard.contains_key(partition.name()) {
                return Err(missing(partition));
            }
        }

        for op in operations {
            match op {
                Operation::Put {
                    partition,
                    key,
                    value,
                } => {
                    if let Some(data) = guard.get_mut(partition.name()) {
                        data.insert(key, value);
                    }
                }
                Operation::Delete { partition, key } => {
                    if let Some(data) = guard.get_mut(partition.name()) {
                        data.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>> {
        let guard = self.read_lock()?;
        let data = guard.get(partition.name()).ok_or_else(|| missing(partition))?;

        let mut results: Vec<(Vec<u8>, Vec<u8>)> = match prefix {
            Some(p) => data
                .range(p.to_vec()..)
                .take_while(|(k, _)| k.starts_with(p))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => data.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        };
        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(Box::new(results.into_iter()))
    }

    fn partition_exists(&self, partition: &Partition) -> bool {
        self.read_lock()
            .map(|guard| guard.contains_key(partition.name()))
            .unwrap_or(false)
    }

    fn create_partition(&self, partition: &Partition) -> Result<()> {
        let mut guard = self.write_lock()?;
        guard
            .entry(partition.name().to_string())
            .or_insert_with(BTreeMap::new);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::with_partitions(&["quotes", "policies"])
    }

    #[test]
    fn test_put_get_delete() {
        let backend = backend();
        let quotes = Partition::new("quotes");

        backend.put(&quotes, b"q1", b"hello").unwrap();
        assert_eq!(backend.get(&quotes, b"q1").unwrap(), Some(b"hello".to_vec()));

        backend.delete(&quotes, b"q1").unwrap();
        assert_eq!(backend.get(&quotes, b"q1").unwrap(), None);

        // Deleting again is fine
        backend.delete(&quotes, b"q1").unwrap();
    }

    #[test]
    fn test_missing_partition_errors() {
        let backend = backend();
        let nope = Partition::new("nope");
        let err = backend.get(&nope, b"k").unwrap_err();
        assert!(matches!(err, StoreError::CollectionMissing(_)));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let backend = backend();
        let quotes = Partition::new("quotes");

        let err = backend
            .batch(vec![
                Operation::Put {
                    partition: quotes.clone(),
                    key: b"q1".to_vec(),
                    value: b"v".to_vec(),
                },
                Operation::Put {
                    partition: Partition::new("nope"),
                    key: b"x".to_vec(),
                    value: b"v".to_vec(),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionMissing(_)));

        // The first put must not have been applied
        assert_eq!(backend.get(&quotes, b"q1").unwrap(), None);
    }

    #[test]
    fn test_scan_prefix_and_limit() {
        let backend = backend();
        let policies = Partition::new("policies");
        backend.put(&policies, b"a1", b"1").unwrap();
        backend.put(&policies, b"a2", b"2").unwrap();
        backend.put(&policies, b"b1", b"3").unwrap();

        let hits: Vec<_> = backend
            .scan(&policies, Some(b"a"), None)
            .unwrap()
            .collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, b"a1");

        let capped: Vec<_> = backend.scan(&policies, None, Some(1)).unwrap().collect();
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_create_partition_is_idempotent() {
        let backend = backend();
        let claims = Partition::new("claims");
        assert!(!backend.partition_exists(&claims));
        backend.create_partition(&claims).unwrap();
        backend.create_partition(&claims).unwrap();
        assert!(backend.partition_exists(&claims));
    }
}
