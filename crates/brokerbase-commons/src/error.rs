//! Shared error taxonomy for the Brokerbase record store.
//!
//! Every public operation either completes with its declared result or
//! rejects with one of these kinds. There is no local recovery or silent
//! retry inside the store; callers decide whether to retry, surface a
//! user-facing message, or fall back to an in-memory store.

use thiserror::Error;

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during record store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The database could not be opened, provisioned, or its persisted
    /// schema version is newer than this build supports.
    #[error("store open failed: {0}")]
    OpenFailed(String),

    /// Operation targeted a collection or index that is not provisioned.
    ///
    /// This also covers unknown collection or index names passed to the
    /// generic operations; the underlying storage API signals both with the
    /// same "not found" condition.
    #[error("missing collection or index: {0}")]
    CollectionMissing(String),

    /// The underlying read/write transaction aborted (engine I/O failure,
    /// quota exhaustion, poisoned lock, blocking-pool join failure).
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// The record payload is unusable: not a JSON object, a typed
    /// conversion failed, or stored bytes did not decode.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
