// Ring 2: Account Access - members edit their own account; business admins manage the rest
use async_trait::async_trait;

use crate::access::Role;
use crate::collections::{CollectionSchema, USERS};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

/// Without the `admin` role a caller may only update their own user record,
/// and never its roles. Creating and deleting users needs `admin`.
#[derive(Default)]
pub struct AccountAccess;

#[async_trait]
impl Observer for AccountAccess {
    fn name(&self) -> &'static str {
        "AccountAccess"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update | Operation::Delete)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(USERS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.is_privileged() {
            return Ok(());
        }
        let Some(principal) = ctx.principal.as_ref() else {
            return Err(ObserverError::SecurityError("Authentication required".to_string()));
        };
        if principal.has_role(Role::Admin) {
            return Ok(());
        }

        if ctx.operation != Operation::Update {
            tracing::warn!("User {} without admin role attempted {:?} on users", principal.user_id, ctx.operation);
            return Err(ObserverError::SecurityError(
                "Only business administrators can add or remove users".to_string(),
            ));
        }

        for record in &ctx.records {
            if record.id() != Some(principal.user_id) {
                tracing::warn!("User {} attempted to update user {:?}", principal.user_id, record.id());
                return Err(ObserverError::SecurityError("You can only update your own account".to_string()));
            }
            if record.changed("roles") {
                return Err(ObserverError::SecurityError(
                    "Only business administrators can change roles".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Principal, TenantRef};
    use crate::collections;
    use crate::database::{MemoryStore, Record};
    use serde_json::json;
    use std::sync::Arc;

    fn member(user_id: i64, role: Role) -> Principal {
        Principal {
            user_id,
            email: "member@shop.test".to_string(),
            business: Some(TenantRef::Id(42)),
            roles: vec![role],
            platform_admin: false,
        }
    }

    fn stored_user(id: i64) -> crate::types::Document {
        json!({ "id": id, "email": "someone@shop.test", "business": 42, "roles": ["cashier"] })
            .as_object()
            .cloned()
            .unwrap()
    }

    fn update(principal: Principal, target: i64, changes: serde_json::Value) -> ObserverContext {
        let record = Record::for_update(stored_user(target), changes).unwrap();
        ObserverContext::new(
            Operation::Update,
            collections::lookup(USERS).unwrap(),
            Some(principal),
            Arc::new(MemoryStore::new()),
            vec![record],
        )
    }

    #[tokio::test]
    async fn member_updates_own_account() {
        let mut ctx = update(member(7, Role::Cashier), 7, json!({ "password": "new-pass" }));
        assert!(AccountAccess.execute(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn member_cannot_touch_other_accounts_or_own_roles() {
        let mut ctx = update(member(7, Role::Cashier), 8, json!({ "password": "new-pass" }));
        assert!(matches!(AccountAccess.execute(&mut ctx).await, Err(ObserverError::SecurityError(_))));

        let mut ctx = update(member(7, Role::Manager), 7, json!({ "roles": ["admin"] }));
        assert!(matches!(AccountAccess.execute(&mut ctx).await, Err(ObserverError::SecurityError(_))));
    }

    #[tokio::test]
    async fn admin_manages_any_account_in_business() {
        let mut ctx = update(member(1, Role::Admin), 8, json!({ "roles": ["manager"] }));
        assert!(AccountAccess.execute(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn member_cannot_delete_users() {
        let mut ctx = ObserverContext::new(
            Operation::Delete,
            collections::lookup(USERS).unwrap(),
            Some(member(7, Role::Manager)),
            Arc::new(MemoryStore::new()),
            vec![Record::for_delete(stored_user(7))],
        );
        assert!(matches!(AccountAccess.execute(&mut ctx).await, Err(ObserverError::SecurityError(_))));
    }
}
