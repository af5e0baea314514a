//! RocksDB implementation of the storage backend.
//!
//! Partitions map to column families. The handle type is the multi-threaded
//! column-family mode so partitions can be created on a shared reference.

use crate::storage::{KvIterator, Operation, Partition, StorageBackend};
use brokerbase_commons::error::{Result, StoreError};
use rocksdb::{
    BoundColumnFamily, DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options,
    WriteBatch,
};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) type Db = DBWithThreadMode<MultiThreaded>;

/// Storage backend backed by a RocksDB database on disk.
#[derive(Debug)]
pub struct RocksDbBackend {
    db: Arc<Db>,
    path: PathBuf,
}

impl RocksDbBackend {
    pub(crate) fn new(db: Arc<Db>, path: PathBuf) -> Self {
        Self { db, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn cf(&self, partition: &Partition) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(partition.name())
            .ok_or_else(|| StoreError::CollectionMissing(partition.name().to_string()))
    }
}

fn engine_error(e: rocksdb::Error) -> StoreError {
    StoreError::TransactionFailed(e.to_string())
}

impl StorageBackend for RocksDbBackend {
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(partition)?;
        self.db.get_cf(&cf, key).map_err(engine_error)
    }

    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.cf(partition)?;
        self.db.put_cf(&cf, key, value).map_err(engine_error)
    }

    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        let cf = self.cf(partition)?;
        self.db.delete_cf(&cf, key).map_err(engine_error)
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                Operation::Put {
                    partition,
                    key,
                    value,
                } => {
                    let cf = self.cf(&partition)?;
                    batch.put_cf(&cf, key, value);
                }
                Operation::Delete { partition, key } => {
                    let cf = self.cf(&partition)?;
                    batch.delete_cf(&cf, key);
                }
            }
        }
        self.db.write(batch).map_err(engine_error)
    }

    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>> {
        let cf = self.cf(partition)?;

        // Iterate under a snapshot so a concurrent write can't surface a
        // half-applied batch mid-scan. Results are collected because the
        // snapshot does not outlive this call.
        let snapshot = self.db.snapshot();
        let mode = match prefix {
            Some(p) => IteratorMode::From(p, Direction::Forward),
            None => IteratorMode::Start,
        };

        let mut results: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
        for item in snapshot.iterator_cf(&cf, mode) {
            let (key, value) = item.map_err(engine_error)?;
            if let Some(p) = prefix {
                if !key.starts_with(p) {
                    break;
                }
            }
            results.push((key.to_vec(), value.to_vec()));
            if let Some(limit) = limit {
                if results.len() >= limit {
                    break;
                }
            }
        }
        Ok(Box::new(results.into_iter()))
    }

    fn partition_exists(&self, partition: &Partition) -> bool {
        self.db.cf_handle(partition.name()).is_some()
    }

    fn create_partition(&self, partition: &Partition) -> Result<()> {
        if self.partition_exists(partition) {
            return Ok(());
        }
        self.db
            .create_cf(partition.name(), &Options::default())
            .map_err(engine_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RocksDbSettings;
    use crate::open::open_for_tests;

    #[test]
    fn test_put_get_delete_round_trip() {
        let (_dir, backend) = open_for_tests().unwrap();
        let quotes = Partition::new("quotes");

        backend.put(&quotes, b"q1", b"payload").unwrap();
        assert_eq!(
            backend.get(&quotes, b"q1").unwrap(),
            Some(b"payload".to_vec())
        );

        backend.delete(&quotes, b"q1").unwrap();
        assert_eq!(backend.get(&quotes, b"q1").unwrap(), None);
    }

    #[test]
    fn test_unknown_partition_is_missing_collection() {
        let (_dir, backend) = open_for_tests().unwrap();
        let err = backend.get(&Partition::new("nope"), b"k").unwrap_err();
        assert!(matches!(err, StoreError::CollectionMissing(_)));
    }

    #[test]
    fn test_batch_applies_atomically() {
        let (_dir, backend) = open_for_tests().unwrap();
        let claims = Partition::new("claims");
        let idx = Partition::new("claims_idx_claimId");

        backend
            .batch(vec![
                Operation::Put {
                    partition: claims.clone(),
                    key: b"c1".to_vec(),
                    value: b"{}".to_vec(),
                },
                Operation::Put {
                    partition: idx.clone(),
                    key: b"CLM001\x00\x00c1".to_vec(),
                    value: b"c1".to_vec(),
                },
            ])
            .unwrap();

        assert!(backend.get(&claims, b"c1").unwrap().is_some());
        assert!(backend.get(&idx, b"CLM001\x00\x00c1").unwrap().is_some());
    }

    #[test]
    fn test_scan_with_prefix_stops_at_boundary() {
        let (_dir, backend) = open_for_tests().unwrap();
        let policies = Partition::new("policies");
        backend.put(&policies, b"a1", b"1").unwrap();
        backend.put(&policies, b"a2", b"2").unwrap();
        backend.put(&policies, b"b1", b"3").unwrap();

        let hits: Vec<_> = backend
            .scan(&policies, Some(b"a"), None)
            .unwrap()
            .collect();
        assert_eq!(hits.len(), 2);

        let all: Vec<_> = backend.scan(&policies, None, None).unwrap().collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_reopen_sees_persisted_data() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RocksDbSettings::default();
        let quotes = Partition::new("quotes");

        {
            let backend = crate::open::open_database(dir.path(), &settings).unwrap();
            backend.put(&quotes, b"q1", b"kept").unwrap();
        }

        let backend = crate::open::open_database(dir.path(), &settings).unwrap();
        assert_eq!(backend.get(&quotes, b"q1").unwrap(), Some(b"kept".to_vec()));
    }
}
