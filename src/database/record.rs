use serde_json::Value;

use crate::types::{Document, Operation, RecordId};

/// Fields owned by the store; never accepted from API input
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Errors that can occur during Record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// A document moving through the write pipeline, with change tracking
/// against the stored version (if any)
#[derive(Debug, Clone)]
pub struct Record {
    /// Stored state (None for CREATE operations)
    original: Option<Document>,
    /// Current field values
    fields: Document,
    operation: Operation,
}

impl Record {
    /// Build a CREATE record from API input, dropping system fields
    pub fn from_api_input(json: Value) -> Result<Self, RecordError> {
        Ok(Self {
            original: None,
            fields: Self::strip_system_fields(json)?,
            operation: Operation::Create,
        })
    }

    /// Build an UPDATE record: stored document with the API changes merged on top
    pub fn for_update(original: Document, changes: Value) -> Result<Self, RecordError> {
        let changes = Self::strip_system_fields(changes)?;
        let mut fields = original.clone();
        for (key, value) in changes {
            fields.insert(key, value);
        }
        Ok(Self {
            original: Some(original),
            fields,
            operation: Operation::Update,
        })
    }

    /// Wrap a stored document for DELETE processing
    pub fn for_delete(original: Document) -> Self {
        Self {
            fields: original.clone(),
            original: Some(original),
            operation: Operation::Delete,
        }
    }

    fn strip_system_fields(json: Value) -> Result<Document, RecordError> {
        match json {
            Value::Object(mut map) => {
                for field in SYSTEM_FIELDS {
                    if map.remove(*field).is_some() {
                        tracing::debug!("Ignoring system field '{}' from API input", field);
                    }
                }
                Ok(map)
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("Attempted to set system field '{}' - ignoring", key);
            return self;
        }
        self.fields.insert(key, value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn original(&self) -> Option<&Document> {
        self.original.as_ref()
    }

    pub fn get_original(&self, key: &str) -> Option<&Value> {
        self.original.as_ref()?.get(key).filter(|v| !v.is_null())
    }

    /// Check if a specific field differs from the stored version
    pub fn changed(&self, key: &str) -> bool {
        match &self.original {
            Some(_) => self.get_original(key) != self.get(key),
            None => self.get(key).is_some(),
        }
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    /// Document body to persist, without store-owned fields
    pub fn into_document(self) -> Document {
        let mut fields = self.fields;
        for field in SYSTEM_FIELDS {
            fields.remove(*field);
        }
        fields
    }
}
