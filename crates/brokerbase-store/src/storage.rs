//! Storage backend abstraction for pluggable engine implementations.
//!
//! The record store never talks to an engine directly; it goes through the
//! `StorageBackend` trait so the same CRUD and index logic runs over RocksDB
//! on disk or over the in-memory backend in tests.
//!
//! ## Partition model
//!
//! A [`Partition`] is a named namespace of key-value pairs. Backends map it
//! to their native concept:
//! - **RocksDB**: column family
//! - **In-memory**: map namespace
//!
//! The store provisions one partition per collection, one per secondary
//! index, and one for metadata; the full list comes from
//! `brokerbase_commons::schema::all_partitions`.

use brokerbase_commons::error::{Result, StoreError};
use std::fmt;

/// Iterator over (key, value) pairs produced by a scan.
pub type KvIterator<'a> = Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 'a>;

/// A logical partition of data within a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    name: String,
}

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Partition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A single operation in an atomic batch.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert or update a key-value pair
    Put {
        partition: Partition,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Delete a key
    Delete { partition: Partition, key: Vec<u8> },
}

/// Trait for pluggable storage backend implementations.
///
/// Implementations must be thread-safe (`Send + Sync`). Error mapping is
/// part of the contract:
/// - a missing partition is `CollectionMissing`
/// - engine read/write failures are `TransactionFailed`
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Retrieves a value by key. `Ok(None)` if the key doesn't exist.
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Stores a key-value pair, replacing any existing value.
    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()>;

    /// Deletes a key. `Ok(())` even if the key doesn't exist (idempotent).
    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()>;

    /// Executes multiple operations atomically: either all succeed or none
    /// are applied. Record upserts ride in the same batch as their index
    /// maintenance so the two can never diverge.
    fn batch(&self, operations: Vec<Operation>) -> Result<()>;

    /// Scans keys in a partition in key order, optionally filtered by
    /// prefix and capped by limit.
    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>>;

    /// Checks if a partition exists.
    fn partition_exists(&self, partition: &Partition) -> bool;

    /// Creates a partition. `Ok(())` if it already exists (idempotent).
    fn create_partition(&self, partition: &Partition) -> Result<()>;
}

/// Extension trait providing async versions of `StorageBackend` methods.
///
/// These offload the synchronous engine calls to the blocking thread pool
/// via `tokio::task::spawn_blocking`, so the async runtime is never stalled
/// by disk I/O.
#[async_trait::async_trait]
pub trait StorageBackendAsync: Send + Sync {
    /// Async version of `get()`.
    async fn get_async(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Async version of `put()`.
    async fn put_async(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()>;

    /// Async version of `delete()`.
    async fn delete_async(&self, partition: &Partition, key: &[u8]) -> Result<()>;

    /// Async version of `batch()`.
    async fn batch_async(&self, operations: Vec<Operation>) -> Result<()>;

    /// Async version of `scan()`. Returns collected results since iterators
    /// can't cross the `spawn_blocking` boundary.
    async fn scan_async(
        &self,
        partition: &Partition,
        prefix: Option<Vec<u8>>,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::TransactionFailed(format!("spawn_blocking join error: {e}"))
}

// Blanket implementation for Arc<dyn StorageBackend>
#[async_trait::async_trait]
impl StorageBackendAsync for std::sync::Arc<dyn StorageBackend> {
    async fn get_async(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let backend = self.clone();
        let partition = partition.clone();
        let key = key.to_vec();
        tokio::task::spawn_blocking(move || backend.get(&partition, &key))
            .await
            .map_err(join_error)?
    }

    async fn put_async(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        let backend = self.clone();
        let partition = partition.clone();
        let key = key.to_vec();
        let value = value.to_vec();
        tokio::task::spawn_blocking(move || backend.put(&partition, &key, &value))
            .await
            .map_err(join_error)?
    }

    async fn delete_async(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        let backend = self.clone();
        let partition = partition.clone();
        let key = key.to_vec();
        tokio::task::spawn_blocking(move || backend.delete(&partition, &key))
            .await
            .map_err(join_error)?
    }

    async fn batch_async(&self, operations: Vec<Operation>) -> Result<()> {
        let backend = self.clone();
        tokio::task::spawn_blocking(move || backend.batch(operations))
            .await
            .map_err(join_error)?
    }

    async fn scan_async(
        &self,
        partition: &Partition,
        prefix: Option<Vec<u8>>,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let backend = self.clone();
        let partition = partition.clone();
        tokio::task::spawn_blocking(move || {
            let iter = backend.scan(&partition, prefix.as_deref(), limit)?;
            Ok(iter.collect())
        })
        .await
        .map_err(join_error)?
    }
}
