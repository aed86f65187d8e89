// Ring 4: Field Defaults - declared defaults for absent fields on create
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct FieldDefaults;

#[async_trait]
impl Observer for FieldDefaults {
    fn name(&self) -> &'static str {
        "FieldDefaults"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let defaults = ctx.collection.defaults;
        for record in &mut ctx.records {
            for (field, default) in defaults {
                if record.get(field).is_none() {
                    record.set(*field, default.to_value());
                }
            }
        }
        Ok(())
    }
}
