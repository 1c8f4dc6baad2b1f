//! Lead record model.
//!
//! The CRM owns the lead schema, so records are kept as opaque field maps.
//! Only the fields this service actually reads (`id`, `Lead_Status`) get
//! typed accessors; everything else passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status values that mark a prior booking as a duplicate trigger: a new
/// submission matching such a record is rejected by the intake workflow.
pub const DISQUALIFYING_STATUSES: [&str; 2] = ["Not Interested", "Invalid"];

/// A lead record as stored in the CRM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lead(pub Map<String, Value>);

impl Lead {
    /// Look up a raw field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The CRM record identifier.
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    /// The lead's status field, when the record carries one.
    pub fn status(&self) -> Option<&str> {
        self.get("Lead_Status").and_then(Value::as_str)
    }

    /// Whether this record's status marks an incoming submission as a
    /// duplicate booking.
    pub fn has_disqualifying_status(&self) -> bool {
        self.status()
            .map(|status| DISQUALIFYING_STATUSES.contains(&status))
            .unwrap_or(false)
    }
}

impl From<Map<String, Value>> for Lead {
    fn from(fields: Map<String, Value>) -> Self {
        Lead(fields)
    }
}

/// Whether any searched record disqualifies the incoming submission.
pub fn any_disqualifying(leads: &[Lead]) -> bool {
    leads.iter().any(Lead::has_disqualifying_status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(fields: Value) -> Lead {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn test_accessors() {
        let record = lead(json!({
            "id": "4876876000000123456",
            "First_Name": "Jane",
            "Lead_Status": "Contacted"
        }));

        assert_eq!(record.id(), Some("4876876000000123456"));
        assert_eq!(record.status(), Some("Contacted"));
        assert_eq!(record.get("First_Name"), Some(&json!("Jane")));
        assert_eq!(record.get("Missing"), None);
    }

    #[test]
    fn test_disqualifying_statuses() {
        assert!(lead(json!({"Lead_Status": "Not Interested"})).has_disqualifying_status());
        assert!(lead(json!({"Lead_Status": "Invalid"})).has_disqualifying_status());

        assert!(!lead(json!({"Lead_Status": "Contacted"})).has_disqualifying_status());
        assert!(!lead(json!({"Lead_Status": "not interested"})).has_disqualifying_status());
        assert!(!lead(json!({"id": "1"})).has_disqualifying_status());
    }

    #[test]
    fn test_any_disqualifying() {
        let clean = vec![
            lead(json!({"Lead_Status": "Contacted"})),
            lead(json!({"Lead_Status": "Qualified"})),
        ];
        assert!(!any_disqualifying(&clean));

        let mixed = vec![
            lead(json!({"Lead_Status": "Contacted"})),
            lead(json!({"Lead_Status": "Invalid"})),
        ];
        assert!(any_disqualifying(&mixed));

        assert!(!any_disqualifying(&[]));
    }

    #[test]
    fn test_transparent_serialization() {
        let record = lead(json!({"id": "1", "Email": "a@b.com"}));
        let round_tripped: Value = serde_json::to_value(&record).unwrap();

        assert_eq!(round_tripped, json!({"id": "1", "Email": "a@b.com"}));
    }
}
