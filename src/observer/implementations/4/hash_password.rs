// Ring 4: Password Hashing - plaintext `password` never reaches the store
use async_trait::async_trait;
use serde_json::Value;

use crate::auth::hash_password;
use crate::collections::{CollectionSchema, USERS};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct HashUserPassword;

#[async_trait]
impl Observer for HashUserPassword {
    fn name(&self) -> &'static str {
        "HashUserPassword"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(USERS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in &mut ctx.records {
            // Client-supplied hashes are discarded
            if record.original().is_none() || record.changed("password_hash") {
                if let Some(original) = record.get_original("password_hash").cloned() {
                    record.set("password_hash", original);
                } else {
                    record.remove("password_hash");
                }
            }

            let Some(password) = record.remove("password") else {
                continue;
            };
            let Some(password) = password.as_str().filter(|p| !p.is_empty()) else {
                return Err(ObserverError::field("password", "must be a non-empty string"));
            };
            let hash = hash_password(password).map_err(|e| ObserverError::PipelineError(e.to_string()))?;
            record.set("password_hash", Value::String(hash));
        }
        Ok(())
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections;
    use crate::database::{MemoryStore, Record};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn password_is_replaced_by_hash() {
        let record = Record::from_api_input(json!({
            "email": "a@shop.test",
            "password": "s3cret",
            "password_hash": "forged"
        }))
        .unwrap();
        let mut ctx = ObserverContext::new(
            Operation::Create,
            collections::lookup(USERS).unwrap(),
            None,
            Arc::new(MemoryStore::new()),
            vec![record],
        );
        HashUserPassword.execute(&mut ctx).await.unwrap();

        let record = &ctx.records[0];
        assert!(record.get("password").is_none());
        let hash = record.get("password_hash").and_then(Value::as_str).unwrap();
        assert!(crate::auth::verify_password("s3cret", hash).unwrap());
    }
}
