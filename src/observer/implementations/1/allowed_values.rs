// Ring 1: Allowed Values - closed value sets declared per collection
use async_trait::async_trait;
use serde_json::Value;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct AllowedValues;

fn check(field: &str, value: &Value, allowed: &[&str]) -> Result<(), ObserverError> {
    let values: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for v in values {
        match v.as_str() {
            Some(s) if allowed.contains(&s) => {}
            _ => {
                return Err(ObserverError::field(
                    field,
                    format!("must be one of: {}", allowed.join(", ")),
                ))
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Observer for AllowedValues {
    fn name(&self) -> &'static str {
        "AllowedValues"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in &ctx.records {
            for (field, allowed) in ctx.collection.enums {
                if let Some(value) = record.get(field) {
                    check(field, value, allowed)?;
                }
            }
        }
        Ok(())
    }
}
