// Ring 0: Email Normalisation - lowercases and trims login emails
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{CollectionSchema, USERS};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct NormalizeUserEmail;

#[async_trait]
impl Observer for NormalizeUserEmail {
    fn name(&self) -> &'static str {
        "NormalizeUserEmail"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(USERS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in &mut ctx.records {
            if let Some(email) = record.get("email").and_then(Value::as_str) {
                let normalized = email.trim().to_lowercase();
                record.set("email", normalized);
            }
        }
        Ok(())
    }
}
