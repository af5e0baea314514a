//! # brokerbase-store
//!
//! Local structured storage for the Brokerbase insurance portal: a small
//! versioned database holding quotes, policies, claims, and medical records,
//! with non-unique secondary indexes for the lookups the portal needs
//! (policy number, PAN, claim id).
//!
//! ```text
//! +---------------------------+
//! |   typed portal API        |  save_policy / search_claims / ...
//! +---------------------------+
//! |   RecordStore             |  CRUD + index maintenance, lazy open
//! +---------------------------+
//! |   StorageBackend trait    |  partitions, atomic batches, scans
//! +-------------+-------------+
//! |  RocksDB    |  in-memory  |
//! +-------------+-------------+
//! ```
//!
//! The store opens lazily: constructing a [`RecordStore`] is free, and the
//! first operation provisions the database (all collections, their index
//! partitions, and the schema version stamp). Records are JSON documents;
//! the store manages only their `id` and `timestamp` fields.

pub mod config;
pub mod memory;
pub mod open;
pub mod portal;
pub mod record_store;
pub mod rocksdb_backend;
pub mod storage;
pub mod test_utils;

pub use config::RocksDbSettings;
pub use memory::InMemoryBackend;
pub use open::open_database;
pub use record_store::RecordStore;
pub use rocksdb_backend::RocksDbBackend;
pub use storage::{KvIterator, Operation, Partition, StorageBackend, StorageBackendAsync};

pub use brokerbase_commons::document::Document;
pub use brokerbase_commons::error::{Result, StoreError};
pub use brokerbase_commons::ids::RecordId;
pub use brokerbase_commons::records::{Claim, MedicalRecord, Policy, Quote};
pub use brokerbase_commons::schema::Collection;
