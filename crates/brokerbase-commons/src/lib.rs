//! # brokerbase-commons
//!
//! Shared vocabulary for the Brokerbase local record store: the error
//! taxonomy, record ids, the fixed collection schema, the schemaless
//! document type, typed record shapes, and storage key encoding.
//!
//! This crate is dependency-light on purpose so that both the storage layer
//! and its callers can speak the same types without pulling in the engine.

pub mod document;
pub mod error;
pub mod ids;
pub mod keys;
pub mod records;
pub mod schema;

pub use document::{Document, FIELD_ID, FIELD_TIMESTAMP};
pub use error::{Result, StoreError};
pub use ids::RecordId;
pub use records::{Claim, MedicalRecord, Policy, Quote};
pub use schema::{Collection, IndexSpec, DB_NAME, SCHEMA_VERSION};
