//! Storage key encoding.
//!
//! Record keys are the raw UTF-8 bytes of the id. Index entries are
//! storekey-encoded `(value, id)` tuples stored in the index's own
//! partition, so an exact-match lookup is a prefix scan with the encoding
//! of `(value,)`. storekey's escape-sequence format terminates each tuple
//! component, which keeps the prefix exact: a search for "POL1" never
//! matches an entry for "POL12". The entry's stored value carries the
//! record id, so index keys never need to be decoded on the read path.

use serde::Serialize;

/// Primary key bytes for a record id.
pub fn record_key(id: &str) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    storekey::serialize(value).expect("storekey encoding should not fail for string tuples")
}

/// Encoding of `(value,)`: the prefix shared by all index entries for this
/// exact value.
pub fn index_scan_prefix(value: &str) -> Vec<u8> {
    encode(&(value,))
}

/// Full index entry key, the `(value, id)` tuple. Entries for the same
/// value stay unique per record.
pub fn index_entry_key(value: &str, id: &str) -> Vec<u8> {
    encode(&(value, id))
}
