use std::sync::Arc;

use serde_json::{json, Value};

use crate::access::{AccessDecision, Principal};
use crate::collections::{self, CollectionSchema};
use crate::database::{Record, Store};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::observer::{ObserverContext, ObserverPipeline};
use crate::state::AppState;
use crate::types::{Document, Operation, RecordId};

/// CRUD over one declared collection with access decisions applied.
///
/// Reads push the guard's filter into the store query. Writes load the target
/// through the same filter, then run through the observer pipeline.
pub struct CollectionService {
    store: Arc<dyn Store>,
    pipeline: Arc<ObserverPipeline>,
    collection: &'static CollectionSchema,
}

impl CollectionService {
    pub fn new(store: Arc<dyn Store>, pipeline: Arc<ObserverPipeline>, collection: &'static CollectionSchema) -> Self {
        Self { store, pipeline, collection }
    }

    /// Service for a collection slug; unknown slugs are 404
    pub fn for_slug(state: &AppState, slug: &str) -> Result<Self, ApiError> {
        let collection =
            collections::lookup(slug).ok_or_else(|| ApiError::not_found(format!("Unknown collection '{}'", slug)))?;
        Ok(Self::new(state.store.clone(), state.pipeline.clone(), collection))
    }

    pub fn collection(&self) -> &'static CollectionSchema {
        self.collection
    }

    fn authenticated(principal: Option<&Principal>) -> Result<&Principal, ApiError> {
        principal.ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }

    fn decide(&self, principal: &Principal, op: Operation) -> AccessDecision {
        self.collection.policy.evaluate(Some(principal), op)
    }

    /// Remove fields that are stored but never returned
    pub fn present(&self, mut doc: Document) -> Document {
        for field in self.collection.hidden {
            doc.remove(*field);
        }
        doc
    }

    /// Hidden fields cannot be matched or sorted on, or their values could be
    /// recovered one guess at a time
    fn reject_hidden_fields(&self, filter: &FilterData) -> Result<(), ApiError> {
        let fields = filter.referenced_fields()?;
        match fields.iter().find(|field| self.collection.hidden.contains(&field.as_str())) {
            Some(field) => Err(ApiError::bad_request(format!(
                "Field '{}' cannot be used to filter or sort {}",
                field, self.collection.slug
            ))),
            None => Ok(()),
        }
    }

    /// List records visible to the caller. A caller the guard denies sees an
    /// empty list rather than an error.
    pub async fn find(&self, principal: Option<&Principal>, filter: FilterData) -> Result<Vec<Document>, ApiError> {
        let principal = Self::authenticated(principal)?;
        self.reject_hidden_fields(&filter)?;
        let Some(scoped) = self.decide(principal, Operation::Read).scope(filter) else {
            tracing::debug!("Read of {} denied for user {}; returning no rows", self.collection.slug, principal.user_id);
            return Ok(Vec::new());
        };

        let rows = self.store.find(self.collection.slug, scoped).await?;
        Ok(rows.into_iter().map(|doc| self.present(doc)).collect())
    }

    /// Existence check without access scoping, for server-side workflows
    pub async fn exists_unscoped(&self, filter: FilterData) -> Result<bool, ApiError> {
        Ok(self.store.exists(self.collection.slug, filter).await?)
    }

    /// Load one stored record through the caller's scope for `op`.
    /// Records outside the scope are indistinguishable from missing ones.
    async fn load_scoped(&self, principal: &Principal, id: RecordId, op: Operation) -> Result<Document, ApiError> {
        let not_found = || ApiError::not_found(format!("{} record {} not found", self.collection.slug, id));

        let decision = self.decide(principal, op);
        if op.is_write() && decision.is_denied() {
            return Err(ApiError::forbidden(format!(
                "You are not allowed to {:?} {} records",
                op, self.collection.slug
            )));
        }

        let scoped = decision
            .scope(FilterData::by_fields([("id", json!(id))]))
            .ok_or_else(not_found)?;
        self.store.find_one(self.collection.slug, scoped).await?.ok_or_else(not_found)
    }

    pub async fn get(&self, principal: Option<&Principal>, id: RecordId) -> Result<Document, ApiError> {
        let principal = Self::authenticated(principal)?;
        let doc = self.load_scoped(principal, id, Operation::Read).await?;
        Ok(self.present(doc))
    }

    pub async fn create(&self, principal: Option<&Principal>, body: Value) -> Result<Document, ApiError> {
        let principal = Self::authenticated(principal)?;
        if self.decide(principal, Operation::Create).is_denied() {
            return Err(ApiError::forbidden(format!("You are not allowed to create {} records", self.collection.slug)));
        }

        let record = Record::from_api_input(body)?;
        let ctx = ObserverContext::new(
            Operation::Create,
            self.collection,
            Some(principal.clone()),
            self.store.clone(),
            vec![record],
        );
        self.run(ctx).await
    }

    /// Create issued by the server itself, exempt from caller checks
    pub async fn create_as_system(&self, body: Value) -> Result<Document, ApiError> {
        let record = Record::from_api_input(body)?;
        let ctx = ObserverContext::new(Operation::Create, self.collection, None, self.store.clone(), vec![record])
            .as_system();
        self.run(ctx).await
    }

    pub async fn update(&self, principal: Option<&Principal>, id: RecordId, changes: Value) -> Result<Document, ApiError> {
        let principal = Self::authenticated(principal)?;
        let original = self.load_scoped(principal, id, Operation::Update).await?;

        let record = Record::for_update(original, changes)?;
        let ctx = ObserverContext::new(
            Operation::Update,
            self.collection,
            Some(principal.clone()),
            self.store.clone(),
            vec![record],
        );
        self.run(ctx).await
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: RecordId) -> Result<Document, ApiError> {
        let principal = Self::authenticated(principal)?;
        if !self.collection.allow_delete {
            return Err(ApiError::forbidden(format!("{} records cannot be deleted", self.collection.slug)));
        }
        let original = self.load_scoped(principal, id, Operation::Delete).await?;

        let ctx = ObserverContext::new(
            Operation::Delete,
            self.collection,
            Some(principal.clone()),
            self.store.clone(),
            vec![Record::for_delete(original)],
        );
        self.run(ctx).await
    }

    async fn run(&self, ctx: ObserverContext) -> Result<Document, ApiError> {
        let result = self.pipeline.execute(ctx).await;
        for warning in &result.warnings {
            tracing::warn!("{} ({}): {}", warning.observer, self.collection.slug, warning.message);
        }

        let mut documents = result.into_documents()?;
        if documents.is_empty() {
            return Err(ApiError::internal_server_error("Write produced no record"));
        }
        Ok(self.present(documents.swap_remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Role, TenantRef};
    use crate::config::BootstrapConfig;
    use crate::database::MemoryStore;

    fn principal(tenant: Option<RecordId>) -> Principal {
        Principal {
            user_id: 100,
            email: "manager@shop.test".to_string(),
            business: tenant.map(TenantRef::Id),
            roles: vec![Role::Manager],
            platform_admin: false,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, Arc<ObserverPipeline>, RecordId, RecordId) {
        let store = Arc::new(MemoryStore::new());
        let a = store.insert(collections::BUSINESSES, Document::new()).await.unwrap();
        let b = store.insert(collections::BUSINESSES, Document::new()).await.unwrap();
        let bootstrap = BootstrapConfig { seed_on_create: false, detached: false, inline_wait_ms: 1_000 };
        let pipeline = ObserverPipeline::standard(&bootstrap);
        (store, Arc::new(pipeline), a["id"].as_i64().unwrap(), b["id"].as_i64().unwrap())
    }

    fn products(store: &Arc<MemoryStore>, pipeline: &Arc<ObserverPipeline>) -> CollectionService {
        CollectionService::new(store.clone(), pipeline.clone(), collections::lookup("products").unwrap())
    }

    #[tokio::test]
    async fn create_stamps_business_and_scopes_reads() {
        let (store, pipeline, a, b) = setup().await;
        let service = products(&store, &pipeline);

        let created = service.create(Some(&principal(Some(a))), json!({ "name": "Rice" })).await.unwrap();
        assert_eq!(created["business"], json!(a));

        let own = service.find(Some(&principal(Some(a))), FilterData::default()).await.unwrap();
        let other = service.find(Some(&principal(Some(b))), FilterData::default()).await.unwrap();
        assert_eq!(own.len(), 1);
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn foreign_record_is_not_found_for_update_and_delete() {
        let (store, pipeline, a, b) = setup().await;
        let service = products(&store, &pipeline);
        let created = service.create(Some(&principal(Some(a))), json!({ "name": "Rice" })).await.unwrap();
        let id = created["id"].as_i64().unwrap();

        let intruder = principal(Some(b));
        let update = service.update(Some(&intruder), id, json!({ "name": "Stolen" })).await.unwrap_err();
        let delete = service.delete(Some(&intruder), id).await.unwrap_err();
        assert_eq!(update.status_code(), 404);
        assert_eq!(delete.status_code(), 404);
        assert_eq!(store.find_by_id("products", id).await.unwrap().unwrap()["name"], json!("Rice"));
    }

    #[tokio::test]
    async fn principal_without_business_reads_nothing_and_cannot_write() {
        let (store, pipeline, a, _) = setup().await;
        let service = products(&store, &pipeline);
        service.create(Some(&principal(Some(a))), json!({ "name": "Rice" })).await.unwrap();

        let loner = principal(None);
        assert!(service.find(Some(&loner), FilterData::default()).await.unwrap().is_empty());

        let err = service.create(Some(&loner), json!({ "name": "Beans" })).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(store.count("products", FilterData::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn anonymous_read_is_unauthorized() {
        let (store, pipeline, _, _) = setup().await;
        let err = products(&store, &pipeline).find(None, FilterData::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn hidden_fields_are_not_returned() {
        let (store, pipeline, a, _) = setup().await;
        let users = CollectionService::new(store.clone(), pipeline.clone(), collections::lookup("users").unwrap());
        let mut admin = principal(Some(a));
        admin.roles = vec![Role::Admin];
        let created = users
            .create(Some(&admin), json!({ "email": "Clerk@Shop.test", "password": "pw" }))
            .await
            .unwrap();
        assert!(!created.contains_key("password_hash"));
        assert!(!created.contains_key("password"));
        assert_eq!(created["email"], json!("clerk@shop.test"));

        let by_hash = FilterData::by_fields([("password_hash", json!({ "$exists": true }))]);
        let err = users.find(Some(&admin), by_hash).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
