use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Document, RecordId};

/// Name of the relation field that ties a record to its owning business
pub const TENANT_FIELD: &str = "business";

/// A reference to a business as it may arrive on a record or a principal:
/// either the bare id or the populated business document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TenantRef {
    Id(RecordId),
    Embedded {
        id: RecordId,
        #[serde(flatten)]
        rest: Document,
    },
}

impl TenantRef {
    pub fn id(&self) -> RecordId {
        match self {
            TenantRef::Id(id) => *id,
            TenantRef::Embedded { id, .. } => *id,
        }
    }

    /// Lenient parse used at every access-control boundary.
    /// Accepts a number, a numeric string, or an object carrying `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(TenantRef::Id),
            Value::String(s) => s.trim().parse().ok().map(TenantRef::Id),
            Value::Object(map) => {
                let id = map.get("id").and_then(|v| TenantRef::from_value(v)).map(|r| r.id())?;
                let mut rest = map.clone();
                rest.remove("id");
                Some(TenantRef::Embedded { id, rest })
            }
            _ => None,
        }
    }
}

impl From<RecordId> for TenantRef {
    fn from(id: RecordId) -> Self {
        TenantRef::Id(id)
    }
}

/// Normalise a relation value to a business id
pub fn tenant_id_of(value: Option<&Value>) -> Option<RecordId> {
    value.and_then(TenantRef::from_value).map(|r| r.id())
}

/// Business id a document belongs to, read from its `business` field
pub fn document_tenant(doc: &Document) -> Option<RecordId> {
    tenant_id_of(doc.get(TENANT_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_and_embedded_refs_normalise_to_the_same_id() {
        assert_eq!(tenant_id_of(Some(&json!(42))), Some(42));
        assert_eq!(tenant_id_of(Some(&json!("42"))), Some(42));
        assert_eq!(tenant_id_of(Some(&json!({ "id": 42, "name": "Corner Shop" }))), Some(42));
        assert_eq!(tenant_id_of(Some(&json!({ "id": "42" }))), Some(42));
    }

    #[test]
    fn unusable_refs_normalise_to_none() {
        assert_eq!(tenant_id_of(None), None);
        assert_eq!(tenant_id_of(Some(&json!(null))), None);
        assert_eq!(tenant_id_of(Some(&json!({ "name": "no id" }))), None);
        assert_eq!(tenant_id_of(Some(&json!("shop"))), None);
    }

    #[test]
    fn deserialises_either_representation() {
        let bare: TenantRef = serde_json::from_value(json!(7)).unwrap();
        let embedded: TenantRef = serde_json::from_value(json!({ "id": 7, "name": "Shop" })).unwrap();
        assert_eq!(bare.id(), 7);
        assert_eq!(embedded.id(), 7);
        assert!(matches!(embedded, TenantRef::Embedded { ref rest, .. } if rest.contains_key("name")));
    }
}
