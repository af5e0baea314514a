//! Typed record shapes for the four portal collections.
//!
//! These are views over the schemaless documents the store persists: the
//! fields the store manages (`id`, `timestamp`) or indexes are named, and
//! everything else rides along in `extra` untouched. Field names follow the
//! persisted camelCase layout.

use crate::ids::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An insurance quote request. Payload is entirely caller-defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Stamped by the store on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An issued policy, searchable by policy number and PAN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub policy_number: String,
    pub pan_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A filed claim, searchable by claim id and by the policy it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub claim_id: String,
    pub policy_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An uploaded medical record. Payload is entirely caller-defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_wire_layout_is_camel_case() {
        let policy = Policy {
            id: Some(RecordId::new("p1")),
            policy_number: "POL123".to_string(),
            pan_number: "ABCDE1234F".to_string(),
            timestamp: None,
            extra: Map::new(),
        };
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(
            json,
            json!({"id": "p1", "policyNumber": "POL123", "panNumber": "ABCDE1234F"})
        );
    }

    #[test]
    fn test_extra_fields_survive_round_trip() {
        let json = json!({
            "id": "c1",
            "claimId": "CLM001",
            "policyNumber": "POL123",
            "status": "under-review",
            "amount": 25000
        });
        let claim: Claim = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(claim.claim_id, "CLM001");
        assert_eq!(claim.extra.get("status"), Some(&json!("under-review")));
        assert_eq!(serde_json::to_value(&claim).unwrap(), json);
    }

    #[test]
    fn test_quote_accepts_arbitrary_payload() {
        let quote: Quote =
            serde_json::from_value(json!({"type": "health", "amount": 5000})).unwrap();
        assert!(quote.id.is_none());
        assert_eq!(quote.extra.get("type"), Some(&json!("health")));
    }
}
