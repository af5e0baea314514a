//! Collection enumeration and fixed database schema.
//!
//! The collection set and its indexes are fixed at compile time. This enum
//! ensures type-safe collection resolution and prevents typos in collection
//! and index names; advancing the schema means bumping [`SCHEMA_VERSION`]
//! and adding entries here — provisioning at open time is purely additive.

/// Directory/database name for the persisted store.
pub const DB_NAME: &str = "brokerbase";

/// Schema version persisted in the meta partition. Bump to trigger
/// provisioning of newly added collections or indexes on the next open.
pub const SCHEMA_VERSION: u32 = 1;

/// Partition holding store-level metadata (currently just the schema version).
pub const META_PARTITION: &str = "meta";

/// Key under which the schema version is stored in the meta partition.
pub const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// A non-unique secondary index over one string field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    /// External index name, as passed to `search_by_index`.
    pub name: &'static str,
    /// Payload field the index key is extracted from.
    pub field: &'static str,
    /// Partition (column family) holding the index entries.
    pub partition: &'static str,
}

/// Record collections of the portal store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `quotes` - insurance quote requests
    Quotes,
    /// `policies` - issued policies, indexed by policy number and PAN
    Policies,
    /// `claims` - filed claims, indexed by claim id and policy number
    Claims,
    /// `medical-records` - uploaded medical records
    MedicalRecords,
}

const POLICY_INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: "policyNumber",
        field: "policyNumber",
        partition: "policies_idx_policyNumber",
    },
    IndexSpec {
        name: "panNumber",
        field: "panNumber",
        partition: "policies_idx_panNumber",
    },
];

const CLAIM_INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: "claimId",
        field: "claimId",
        partition: "claims_idx_claimId",
    },
    IndexSpec {
        name: "policyNumber",
        field: "policyNumber",
        partition: "claims_idx_policyNumber",
    },
];

impl Collection {
    /// Collection name as seen by callers and used for the record partition.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Quotes => "quotes",
            Collection::Policies => "policies",
            Collection::Claims => "claims",
            Collection::MedicalRecords => "medical-records",
        }
    }

    /// Resolve a caller-supplied collection name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quotes" => Some(Collection::Quotes),
            "policies" => Some(Collection::Policies),
            "claims" => Some(Collection::Claims),
            "medical-records" => Some(Collection::MedicalRecords),
            _ => None,
        }
    }

    /// Secondary indexes defined for this collection.
    pub fn indexes(&self) -> &'static [IndexSpec] {
        match self {
            Collection::Policies => POLICY_INDEXES,
            Collection::Claims => CLAIM_INDEXES,
            Collection::Quotes | Collection::MedicalRecords => &[],
        }
    }

    /// Look up an index of this collection by its external name.
    pub fn index(&self, name: &str) -> Option<&'static IndexSpec> {
        self.indexes().iter().find(|spec| spec.name == name)
    }

    /// All collections, in provisioning order.
    pub fn all() -> &'static [Collection] {
        &[
            Collection::Quotes,
            Collection::Policies,
            Collection::Claims,
            Collection::MedicalRecords,
        ]
    }
}

/// Every partition the store provisions: one per collection, one per index,
/// plus the meta partition.
pub fn all_partitions() -> Vec<&'static str> {
    let mut names = Vec::new();
    for collection in Collection::all() {
        names.push(collection.name());
        for index in collection.indexes() {
            names.push(index.partition);
        }
    }
    names.push(META_PARTITION);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for collection in Collection::all() {
            assert_eq!(Collection::from_name(collection.name()), Some(*collection));
        }
        assert_eq!(Collection::from_name("premiums"), None);
        assert_eq!(Collection::from_name(""), None);
    }

    #[test]
    fn test_index_lookup() {
        let idx = Collection::Policies.index("policyNumber").unwrap();
        assert_eq!(idx.field, "policyNumber");
        assert_eq!(idx.partition, "policies_idx_policyNumber");

        // claims and policies both index policyNumber, in separate partitions
        let claims_idx = Collection::Claims.index("policyNumber").unwrap();
        assert_ne!(claims_idx.partition, idx.partition);

        assert!(Collection::Quotes.index("policyNumber").is_none());
        assert!(Collection::Policies.index("claimId").is_none());
    }

    #[test]
    fn test_all_partitions_complete() {
        let names = all_partitions();
        assert_eq!(names.len(), 4 + 4 + 1);
        for expected in [
            "quotes",
            "policies",
            "claims",
            "medical-records",
            "policies_idx_policyNumber",
            "policies_idx_panNumber",
            "claims_idx_claimId",
            "claims_idx_policyNumber",
            META_PARTITION,
        ] {
            assert!(names.contains(&expected), "missing partition {expected}");
        }
    }
}
