// Ring 6: Seed Default Units - new businesses get the default unit catalog
use std::time::Duration;

use async_trait::async_trait;

use crate::collections::{CollectionSchema, BUSINESSES};
use crate::config::BootstrapConfig;
use crate::database::document_id;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;
use crate::units::seed_for_new_business;

/// Seeding problems are logged and never fail the business creation.
///
/// Seeding always runs on its own task. Inline mode waits up to `inline_wait`
/// for it; past that the task keeps running and the request moves on.
pub struct SeedDefaultUnits {
    /// Spawn on the runtime instead of finishing before the response
    detached: bool,
    inline_wait: Duration,
}

impl SeedDefaultUnits {
    pub fn new(config: &BootstrapConfig) -> Self {
        Self {
            detached: config.detached,
            inline_wait: Duration::from_millis(config.inline_wait_ms),
        }
    }
}

#[async_trait]
impl Observer for SeedDefaultUnits {
    fn name(&self) -> &'static str {
        "SeedDefaultUnits"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::PostDatabase
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(BUSINESSES)
    }

    fn timeout(&self) -> Duration {
        self.inline_wait + Duration::from_secs(5)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let created: Vec<_> = ctx.result.iter().flatten().filter_map(document_id).collect();

        for business_id in created {
            let seeding = tokio::spawn(seed_for_new_business(ctx.store.clone(), business_id));
            if self.detached {
                continue;
            }
            match tokio::time::timeout(self.inline_wait, seeding).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Default unit seeding for business {} aborted: {}", business_id, e),
                Err(_) => tracing::warn!(
                    "Default unit seeding for business {} still running after {:?}; continuing in the background",
                    business_id,
                    self.inline_wait
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::UNITS;
    use crate::database::{MemoryStore, Store, StoreError};
    use crate::filter::FilterData;
    use crate::observer::ObserverPipeline;
    use crate::services::CollectionService;
    use crate::types::{Document, RecordId};
    use serde_json::json;
    use std::sync::Arc;

    /// Memory store whose unit inserts take a while
    struct SlowUnits {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl Store for SlowUnits {
        async fn find(&self, c: &str, f: FilterData) -> Result<Vec<Document>, StoreError> {
            self.inner.find(c, f).await
        }
        async fn find_by_id(&self, c: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
            self.inner.find_by_id(c, id).await
        }
        async fn count(&self, c: &str, f: FilterData) -> Result<i64, StoreError> {
            self.inner.count(c, f).await
        }
        async fn insert(&self, c: &str, data: Document) -> Result<Document, StoreError> {
            if c == UNITS {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.insert(c, data).await
        }
        async fn update(&self, c: &str, id: RecordId, data: Document) -> Result<Document, StoreError> {
            self.inner.update(c, id, data).await
        }
        async fn delete(&self, c: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
            self.inner.delete(c, id).await
        }
        async fn health_check(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_seeding_does_not_fail_business_creation() {
        let store = Arc::new(SlowUnits { inner: MemoryStore::new(), delay: Duration::from_millis(50) });
        let config = BootstrapConfig { seed_on_create: true, detached: false, inline_wait_ms: 20 };
        let pipeline = Arc::new(ObserverPipeline::standard(&config));
        let businesses =
            CollectionService::new(store.clone(), pipeline, crate::collections::lookup(BUSINESSES).unwrap());

        let created = businesses
            .create_as_system(json!({ "name": "Corner Shop", "email": "owner@corner.test", "country": "KE", "city": "Nairobi" }))
            .await
            .unwrap();
        let business = created["id"].as_i64().unwrap();
        let scoped = || FilterData::by_fields([("business", json!(business))]);
        assert!(store.count(UNITS, scoped()).await.unwrap() < 11);

        // The seeding task keeps going after the request has returned
        for _ in 0..100 {
            if store.count(UNITS, scoped()).await.unwrap() == 11 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.count(UNITS, scoped()).await.unwrap(), 11);
    }
}
