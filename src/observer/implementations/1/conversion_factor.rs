// Ring 1: Conversion Factor - edges need a positive factor between two distinct units
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{CollectionSchema, UNIT_CONVERSIONS};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct ConversionFactor;

#[async_trait]
impl Observer for ConversionFactor {
    fn name(&self) -> &'static str {
        "ConversionFactor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(UNIT_CONVERSIONS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in &ctx.records {
            match record.get("factor").and_then(Value::as_f64) {
                Some(f) if f.is_finite() && f > 0.0 => {}
                _ => return Err(ObserverError::field("factor", "must be a positive number")),
            }
            if record.get("from_unit").is_some() && record.get("from_unit") == record.get("to_unit") {
                return Err(ObserverError::field("to_unit", "must differ from from_unit"));
            }
        }
        Ok(())
    }
}
