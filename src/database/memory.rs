use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{stamp, Store, StoreError};
use crate::filter::{Filter, FilterData, FilterOrder, FilterWhere};
use crate::types::{Document, RecordId};

/// In-process document store used for tests and `--store memory`
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<RecordId, Document>>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matching(docs: &BTreeMap<RecordId, Document>, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let mut out = Vec::new();
        for doc in docs.values() {
            let keep = match filter.where_data() {
                Some(where_data) => FilterWhere::matches(where_data, doc)?,
                None => true,
            };
            if keep {
                out.push(doc.clone());
            }
        }
        Ok(out)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, collection: &str, filter_data: FilterData) -> Result<Vec<Document>, StoreError> {
        let filter = Filter::from_data(collection, filter_data)?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut rows = Self::matching(docs, &filter)?;
        if !filter.order_data().is_empty() {
            FilterOrder::sort(&mut rows, filter.order_data());
        }

        let offset = filter.offset_value().unwrap_or(0).max(0) as usize;
        let rows = rows.into_iter().skip(offset);
        Ok(match filter.limit_value() {
            Some(limit) => rows.take(limit.max(0) as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(&id)).cloned())
    }

    async fn count(&self, collection: &str, filter_data: FilterData) -> Result<i64, StoreError> {
        let filter = Filter::from_data(collection, FilterData { where_clause: filter_data.where_clause, ..Default::default() })?;
        let collections = self.collections.read().await;
        Ok(match collections.get(collection) {
            Some(docs) => Self::matching(docs, &filter)?.len() as i64,
            None => 0,
        })
    }

    async fn insert(&self, collection: &str, data: Document) -> Result<Document, StoreError> {
        Filter::new(collection)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let doc = stamp(data, id, None);
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().insert(id, doc.clone());
        tracing::trace!("memory store insert {}#{}", collection, id);
        Ok(doc)
    }

    async fn update(&self, collection: &str, id: RecordId, data: Document) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound(format!("{} record {} not found", collection, id)))?;
        let doc = stamp(data, id, existing.get("createdAt").cloned());
        *existing = doc.clone();
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections.get_mut(collection).and_then(|docs| docs.remove(&id)))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
