//! Schemaless record documents.
//!
//! The store does not interpret payloads beyond the primary key and the
//! indexed fields, so records travel as JSON objects. [`Document`] wraps a
//! `serde_json::Map` and adds the store-managed field contract: every record
//! has an `id` and a `timestamp`, both stamped by the store on save.

use crate::error::{Result, StoreError};
use crate::ids::RecordId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary-key field present in every stored record.
pub const FIELD_ID: &str = "id";

/// Write-time stamp (epoch milliseconds), refreshed on every save.
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// An opaque, caller-defined payload stored under a unique id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Wrap a JSON value; anything other than an object is rejected.
    /// The error names only the value's JSON type; payloads never end up
    /// in error strings or logs.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Document(map)),
            other => Err(StoreError::InvalidRecord(format!(
                "record must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Serialize any record type into a document.
    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self> {
        let json =
            serde_json::to_value(value).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        Self::from_value(json)
    }

    /// Deserialize the document into a typed record.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }

    pub fn id(&self) -> Option<&str> {
        self.field_str(FIELD_ID)
    }

    pub fn set_id(&mut self, id: &RecordId) {
        self.0
            .insert(FIELD_ID.to_string(), Value::String(id.as_str().to_string()));
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.0.get(FIELD_TIMESTAMP).and_then(Value::as_i64)
    }

    pub fn set_timestamp(&mut self, millis: i64) {
        self.0
            .insert(FIELD_TIMESTAMP.to_string(), Value::Number(millis.into()));
    }

    /// String value of a field, used for index key extraction. Missing or
    /// non-string fields yield `None` and the record is simply not indexed.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}
