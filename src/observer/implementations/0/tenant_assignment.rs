// Ring 0: Tenant Assignment - stamps the caller's business on tenant-owned records
use async_trait::async_trait;
use serde_json::json;

use crate::access::{tenant_id_of, TENANT_FIELD};
use crate::collections::CollectionSchema;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

/// Fills `business` from the caller when the payload leaves it out.
///
/// A business the payload already names is stored as the bare id, whether it
/// arrived as a number, a numeric string or an embedded document, so scoped
/// queries match it. Values that do not resolve to an id are kept for ring 2
/// to reject. A caller without a business leaves the field absent, so
/// required-field validation rejects the write.
#[derive(Default)]
pub struct TenantAssignment;

#[async_trait]
impl Observer for TenantAssignment {
    fn name(&self) -> &'static str {
        "TenantAssignment"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is_tenant_scoped()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let caller_tenant = ctx.principal_tenant();

        for record in &mut ctx.records {
            let named = record.get(TENANT_FIELD).map(|value| tenant_id_of(Some(value)));
            match (named, caller_tenant) {
                (Some(Some(id)), _) | (None, Some(id)) => {
                    record.set(TENANT_FIELD, json!(id));
                }
                (Some(None), _) => {}
                (None, None) => {
                    tracing::debug!("No business on caller; leaving {} record unassigned", ctx.collection.slug);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Principal, Role, TenantRef};
    use crate::collections;
    use crate::database::{MemoryStore, Record};
    use std::sync::Arc;

    fn principal(tenant: Option<i64>) -> Principal {
        Principal {
            user_id: 1,
            email: "cashier@shop.test".to_string(),
            business: tenant.map(TenantRef::Id),
            roles: vec![Role::Cashier],
            platform_admin: false,
        }
    }

    fn ctx(principal: Option<Principal>, body: serde_json::Value) -> ObserverContext {
        ObserverContext::new(
            Operation::Create,
            collections::lookup("products").unwrap(),
            principal,
            Arc::new(MemoryStore::new()),
            vec![Record::from_api_input(body).unwrap()],
        )
    }

    #[tokio::test]
    async fn stamps_missing_business() {
        let mut ctx = ctx(Some(principal(Some(42))), json!({ "name": "Rice" }));
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.records[0].get("business"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn leaves_explicit_business_untouched() {
        let mut ctx = ctx(Some(principal(Some(42))), json!({ "name": "Rice", "business": 7 }));
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.records[0].get("business"), Some(&json!(7)));
    }

    #[tokio::test]
    async fn string_and_embedded_business_are_stored_as_ids() {
        let mut ctx = ctx(Some(principal(Some(42))), json!({ "name": "Rice", "business": "42" }));
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.records[0].get("business"), Some(&json!(42)));

        let body = json!({ "name": "Rice", "business": { "id": 42, "name": "Shop A" } });
        let mut ctx = self::ctx(Some(principal(Some(42))), body);
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.records[0].get("business"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn unresolvable_business_is_left_for_integrity_check() {
        let mut ctx = ctx(Some(principal(Some(42))), json!({ "name": "Rice", "business": "corner-shop" }));
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.records[0].get("business"), Some(&json!("corner-shop")));
    }

    #[tokio::test]
    async fn caller_without_business_leaves_field_absent() {
        let mut ctx = ctx(Some(principal(None)), json!({ "name": "Rice" }));
        TenantAssignment.execute(&mut ctx).await.unwrap();
        assert!(ctx.records[0].get("business").is_none());
    }
}
