// Ring 7: Change Log - structured audit line per written record
use async_trait::async_trait;

use crate::database::document_id;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct ChangeLog;

#[async_trait]
impl Observer for ChangeLog {
    fn name(&self) -> &'static str {
        "ChangeLog"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Audit
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op.is_write()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let actor = ctx.principal.as_ref().map(|p| p.user_id);
        for (record, doc) in ctx.records.iter().zip(ctx.result.iter().flatten()) {
            let changed: Vec<&str> = record
                .fields()
                .keys()
                .map(String::as_str)
                .filter(|field| record.changed(field))
                .collect();
            tracing::info!(
                target: "audit",
                operation = ?ctx.operation,
                collection = ctx.collection.slug,
                record = ?document_id(doc),
                actor = ?actor,
                system = ctx.system,
                "changed fields: {:?}",
                changed
            );
        }
        Ok(())
    }
}
