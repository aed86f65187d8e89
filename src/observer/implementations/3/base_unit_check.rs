// Ring 3: Base Unit Check - warns when a group gets a second base unit
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::access::{tenant_id_of, TENANT_FIELD};
use crate::collections::{CollectionSchema, UNITS};
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::{ObserverError, ObserverWarning};
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::Operation;

/// One base unit per (business, group) is a convention, not a constraint:
/// the write goes through with a warning.
#[derive(Default)]
pub struct BaseUnitCheck;

#[async_trait]
impl Observer for BaseUnitCheck {
    fn name(&self) -> &'static str {
        "BaseUnitCheck"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(UNITS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut warnings = Vec::new();

        for record in &ctx.records {
            if record.get("is_base_unit").and_then(Value::as_bool) != Some(true) {
                continue;
            }
            let (Some(tenant), Some(group)) = (
                tenant_id_of(record.get(TENANT_FIELD)),
                record.get("unit_group").and_then(Value::as_str),
            ) else {
                continue;
            };

            let mut filter = FilterData::by_fields([
                (TENANT_FIELD, json!(tenant)),
                ("unit_group", json!(group)),
                ("is_base_unit", json!(true)),
            ]);
            if let Some(id) = record.id() {
                filter = filter.and_where(json!({ "id": { "$ne": id } }));
            }

            if ctx.store.exists(UNITS, filter).await? {
                tracing::warn!("Business {} now has more than one {} base unit", tenant, group);
                warnings.push(ObserverWarning::new(
                    self.name(),
                    self.ring(),
                    format!("{} already has a base unit", group),
                ));
            }
        }

        for warning in warnings {
            ctx.add_warning(warning);
        }
        Ok(())
    }
}
