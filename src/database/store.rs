use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::filter::{FilterData, FilterError};
use crate::types::{Document, RecordId};

/// Errors raised by a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<FilterError> for StoreError {
    fn from(err: FilterError) -> Self {
        StoreError::QueryError(err.to_string())
    }
}

/// Persistence seam: collections of JSON documents keyed by a numeric id.
///
/// Implementations assign `id` on insert and maintain `createdAt` / `updatedAt`.
/// Tenant scoping is never applied here; callers push it down through the
/// `FilterData` they pass.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, collection: &str, filter: FilterData) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError>;

    async fn count(&self, collection: &str, filter: FilterData) -> Result<i64, StoreError>;

    async fn insert(&self, collection: &str, data: Document) -> Result<Document, StoreError>;

    /// Replace the stored document body; `id` and `createdAt` are preserved
    async fn update(&self, collection: &str, id: RecordId, data: Document) -> Result<Document, StoreError>;

    async fn delete(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, filter: FilterData) -> Result<Option<Document>, StoreError> {
        let mut rows = self.find(collection, filter.with_limit(1)).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn exists(&self, collection: &str, filter: FilterData) -> Result<bool, StoreError> {
        Ok(self.count(collection, filter).await? > 0)
    }
}

/// Stamp store-owned fields on a document being written
pub(crate) fn stamp(mut data: Document, id: RecordId, created_at: Option<Value>) -> Document {
    let now = Value::String(Utc::now().to_rfc3339());
    data.insert("id".to_string(), Value::from(id));
    data.insert("createdAt".to_string(), created_at.unwrap_or_else(|| now.clone()));
    data.insert("updatedAt".to_string(), now);
    data
}

/// Read a numeric id out of a document field
pub fn document_id(doc: &Document) -> Option<RecordId> {
    doc.get("id").and_then(Value::as_i64)
}
