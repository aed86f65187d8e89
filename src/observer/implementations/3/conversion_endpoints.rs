// Ring 3: Conversion Endpoints - both ends of an edge are units of the edge's business
use async_trait::async_trait;
use serde_json::json;

use crate::access::{tenant_id_of, TENANT_FIELD};
use crate::collections::{CollectionSchema, UNITS, UNIT_CONVERSIONS};
use crate::database::Record;
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};
use crate::types::{Document, Operation, RecordId};
use crate::units::Unit;

#[derive(Default)]
pub struct ConversionEndpoints;

async fn endpoint(
    ctx: &ObserverContext,
    record: &Record,
    field: &'static str,
    tenant: RecordId,
) -> Result<Unit, ObserverError> {
    let Some(id) = record.get(field).and_then(serde_json::Value::as_i64) else {
        return Err(ObserverError::field(field, "must be a unit id"));
    };
    let filter = FilterData::by_fields([("id", json!(id)), (TENANT_FIELD, json!(tenant))]);
    ctx.store
        .find_one(UNITS, filter)
        .await?
        .as_ref()
        .and_then(|doc: &Document| Unit::from_document(doc))
        .ok_or_else(|| ObserverError::field(field, format!("unit {} not found in this business", id)))
}

#[async_trait]
impl Observer for ConversionEndpoints {
    fn name(&self) -> &'static str {
        "ConversionEndpoints"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: &CollectionSchema) -> bool {
        collection.is(UNIT_CONVERSIONS)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for record in &ctx.records {
            let Some(tenant) = tenant_id_of(record.get(TENANT_FIELD)) else {
                continue;
            };
            let from = endpoint(ctx, record, "from_unit", tenant).await?;
            let to = endpoint(ctx, record, "to_unit", tenant).await?;
            if from.unit_group != to.unit_group {
                return Err(ObserverError::field(
                    "to_unit",
                    format!("cannot convert between {} and {}", from.unit_group, to.unit_group),
                ));
            }
        }
        Ok(())
    }
}
