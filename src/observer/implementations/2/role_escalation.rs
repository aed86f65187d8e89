// Ring 2: Role Escalation - only platform staff can grant platform-wide roles
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{CollectionSchema, USERS};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct RoleEscalation;

#[async_trait]
impl Observer for RoleEscalation {
    fn name(&self) -> &'static str {
        "RoleEscalation"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(USERS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.is_privileged() {
            return Ok(());
        }

        let grants_super_admin = ctx.records.iter().filter(|r| r.changed("roles")).any(|r| {
            r.get("roles")
                .and_then(Value::as_array)
                .map(|roles| roles.iter().any(|role| role.as_str() == Some("super-admin")))
                .unwrap_or(false)
        });

        if grants_super_admin {
            return Err(ObserverError::SecurityError("Only platform administrators can grant super-admin".to_string()));
        }
        Ok(())
    }
}
