// Ring 1: Required Fields - every declared field present and non-empty
use async_trait::async_trait;
use serde_json::Value;

use crate::database::Record;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct RequiredFields;

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Missing required fields of one record
pub fn missing_fields(record: &Record, required: &[&'static str]) -> Vec<&'static str> {
    required.iter().copied().filter(|field| is_blank(record.get(field))).collect()
}

#[async_trait]
impl Observer for RequiredFields {
    fn name(&self) -> &'static str {
        "RequiredFields"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        // Update records carry the merged stored document, so clearing a
        // required field is caught here too
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let required = ctx.collection.required;
        let mut errors = Vec::new();
        for record in &ctx.records {
            for field in missing_fields(record, required) {
                errors.push(ObserverError::field(field, "is required"));
            }
        }

        if let Some(last) = errors.pop() {
            for error in errors {
                ctx.add_error(error);
            }
            return Err(last);
        }
        Ok(())
    }
}
