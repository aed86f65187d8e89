// Ring 2: Tenant Integrity - a record's business must be the caller's and must exist
use async_trait::async_trait;

use crate::access::{tenant_id_of, TENANT_FIELD};
use crate::collections::{CollectionSchema, BUSINESSES};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

/// Non-privileged callers may only write records of their own business and
/// may never move a record to another business. Every caller must reference
/// a business that exists.
#[derive(Default)]
pub struct TenantIntegrity;

#[async_trait]
impl Observer for TenantIntegrity {
    fn name(&self) -> &'static str {
        "TenantIntegrity"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is_tenant_scoped()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let privileged = ctx.is_privileged();
        let caller_tenant = ctx.principal_tenant();

        for record in &ctx.records {
            let Some(tenant) = tenant_id_of(record.get(TENANT_FIELD)) else {
                return Err(ObserverError::field(TENANT_FIELD, "must reference a business"));
            };

            if !privileged {
                if caller_tenant != Some(tenant) {
                    tracing::warn!(
                        "Rejected {:?} on {} for business {} by caller of business {:?}",
                        ctx.operation,
                        ctx.collection.slug,
                        tenant,
                        caller_tenant
                    );
                    return Err(ObserverError::SecurityError(
                        "Records can only be written for your own business".to_string(),
                    ));
                }
                if let Some(original) = record.get_original(TENANT_FIELD) {
                    if tenant_id_of(Some(original)) != Some(tenant) {
                        return Err(ObserverError::SecurityError("The business of a record cannot be changed".to_string()));
                    }
                }
            }

            let is_new_reference = record
                .get_original(TENANT_FIELD)
                .map(|original| tenant_id_of(Some(original)) != Some(tenant))
                .unwrap_or(true);
            if is_new_reference && ctx.store.find_by_id(BUSINESSES, tenant).await?.is_none() {
                return Err(ObserverError::field(TENANT_FIELD, format!("business {} does not exist", tenant)));
            }
        }
        Ok(())
    }
}
