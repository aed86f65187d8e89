// Ring 5: Persist Records - the only observer that writes to the store
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct PersistRecords;

#[async_trait]
impl Observer for PersistRecords {
    fn name(&self) -> &'static str {
        "PersistRecords"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op.is_write()
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let collection = ctx.collection.slug;
        let mut written = Vec::with_capacity(ctx.records.len());

        for record in &ctx.records {
            let doc = match ctx.operation {
                Operation::Create => ctx.store.insert(collection, record.clone().into_document()).await?,
                Operation::Update => {
                    let id = record
                        .id()
                        .ok_or_else(|| ObserverError::ValidationError("UPDATE record missing id".to_string()))?;
                    ctx.store.update(collection, id, record.clone().into_document()).await?
                }
                Operation::Delete => {
                    let id = record
                        .id()
                        .ok_or_else(|| ObserverError::ValidationError("DELETE record missing id".to_string()))?;
                    ctx.store
                        .delete(collection, id)
                        .await?
                        .ok_or_else(|| ObserverError::NotFound(format!("{} record {} not found", collection, id)))?
                }
                Operation::Read => continue,
            };
            written.push(doc);
        }

        tracing::debug!("{:?} {} x{} persisted", ctx.operation, collection, written.len());
        ctx.result = Some(written);
        Ok(())
    }
}
