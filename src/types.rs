/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Collection operations supported throughout the system
/// Used by the access guards, the observer pipeline and individual records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::Read)
    }
}

/// Record identifiers are numeric, assigned by the store on insert
pub type RecordId = i64;

/// A stored document: a flat JSON object keyed by field name
pub type Document = serde_json::Map<String, serde_json::Value>;
