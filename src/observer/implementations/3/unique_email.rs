// Ring 3: Unique Email - one user per login email
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::collections::{CollectionSchema, USERS};
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct UniqueEmail;

#[async_trait]
impl Observer for UniqueEmail {
    fn name(&self) -> &'static str {
        "UniqueEmail"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(USERS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in ctx.records_with_field_changes("email") {
            let Some(email) = record.get("email").and_then(Value::as_str) else {
                continue;
            };
            // Checked across every business: emails identify logins
            let mut filter = FilterData::by_fields([("email", json!(email))]);
            if let Some(id) = record.id() {
                filter = filter.and_where(json!({ "id": { "$ne": id } }));
            }
            if ctx.store.exists(USERS, filter).await? {
                return Err(ObserverError::Conflict(format!("A user with email {} already exists", email)));
            }
        }
        Ok(())
    }
}
