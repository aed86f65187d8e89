use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::catalog::{DEFAULT_CONVERSIONS, DEFAULT_UNITS};
use crate::access::TENANT_FIELD;
use crate::collections::{UNITS, UNIT_CONVERSIONS};
use crate::database::{document_id, Store, StoreError};
use crate::filter::FilterData;
use crate::types::{Document, RecordId};

/// Outcome of a multi-step operation that keeps going past individual failures.
///
/// Unlike `Result`, a degraded outcome still carries everything that did succeed.
#[must_use]
#[derive(Debug)]
pub enum BestEffort<T> {
    Complete(T),
    Degraded { partial: T, failures: Vec<SeedFailure> },
}

impl<T> BestEffort<T> {
    fn from_parts(value: T, failures: Vec<SeedFailure>) -> Self {
        if failures.is_empty() {
            BestEffort::Complete(value)
        } else {
            BestEffort::Degraded { partial: value, failures }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, BestEffort::Complete(_))
    }

    pub fn value(&self) -> &T {
        match self {
            BestEffort::Complete(value) => value,
            BestEffort::Degraded { partial, .. } => partial,
        }
    }

    pub fn failures(&self) -> &[SeedFailure] {
        match self {
            BestEffort::Complete(_) => &[],
            BestEffort::Degraded { failures, .. } => failures,
        }
    }

    pub fn into_parts(self) -> (T, Vec<SeedFailure>) {
        match self {
            BestEffort::Complete(value) => (value, Vec::new()),
            BestEffort::Degraded { partial, failures } => (partial, failures),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    pub item: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub units_created: usize,
    pub conversions_created: usize,
    pub units: Vec<Document>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Default units already exist for business {0}")]
    AlreadySeeded(RecordId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn unit_document(tenant: RecordId, unit: &super::catalog::DefaultUnit) -> Document {
    let mut doc = Document::new();
    doc.insert(TENANT_FIELD.to_string(), json!(tenant));
    doc.insert("name".to_string(), json!(unit.name));
    doc.insert("short_name".to_string(), json!(unit.short_name));
    doc.insert("unit_group".to_string(), json!(unit.group.as_str()));
    doc.insert("is_base_unit".to_string(), json!(unit.is_base_unit));
    doc.insert("allow_decimal".to_string(), json!(unit.allow_decimal));
    doc
}

fn conversion_document(tenant: RecordId, from: RecordId, to: RecordId, factor: f64) -> Document {
    let mut doc = Document::new();
    doc.insert(TENANT_FIELD.to_string(), json!(tenant));
    doc.insert("from_unit".to_string(), json!(from));
    doc.insert("to_unit".to_string(), json!(to));
    doc.insert("factor".to_string(), json!(factor));
    doc
}

/// Seed the default unit catalog for one business.
///
/// Refuses with `AlreadySeeded` (and writes nothing) when the business has any
/// unit at all. Units are written first so edges can be resolved by short name;
/// an edge whose endpoint failed to write is skipped. Individual write failures
/// are collected into the outcome instead of aborting the run.
///
/// The existence check and the writes are not atomic: two concurrent seeds for
/// the same business can both pass the check.
pub async fn seed_default_units(
    store: &dyn Store,
    tenant: RecordId,
) -> Result<BestEffort<SeedReport>, BootstrapError> {
    if store.exists(UNITS, FilterData::by_fields([(TENANT_FIELD, json!(tenant))])).await? {
        tracing::warn!("Refusing to seed units for business {}: units already exist", tenant);
        return Err(BootstrapError::AlreadySeeded(tenant));
    }

    let mut report = SeedReport::default();
    let mut failures = Vec::new();
    let mut ids_by_short_name: HashMap<&'static str, RecordId> = HashMap::new();

    for unit in DEFAULT_UNITS {
        match store.insert(UNITS, unit_document(tenant, unit)).await {
            Ok(created) => {
                if let Some(id) = document_id(&created) {
                    ids_by_short_name.insert(unit.short_name, id);
                }
                report.units_created += 1;
                report.units.push(created);
            }
            Err(e) => {
                tracing::warn!("Failed to seed unit '{}' for business {}: {}", unit.short_name, tenant, e);
                failures.push(SeedFailure { item: format!("unit:{}", unit.short_name), error: e.to_string() });
            }
        }
    }

    for conversion in DEFAULT_CONVERSIONS {
        let (Some(&from), Some(&to)) = (ids_by_short_name.get(conversion.from), ids_by_short_name.get(conversion.to))
        else {
            tracing::debug!("Skipping conversion {} -> {}: endpoint not seeded", conversion.from, conversion.to);
            continue;
        };

        match store.insert(UNIT_CONVERSIONS, conversion_document(tenant, from, to, conversion.factor)).await {
            Ok(_) => report.conversions_created += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to seed conversion {} -> {} for business {}: {}",
                    conversion.from,
                    conversion.to,
                    tenant,
                    e
                );
                failures.push(SeedFailure {
                    item: format!("conversion:{}->{}", conversion.from, conversion.to),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Seeded {} units and {} conversions for business {} ({} failures)",
        report.units_created,
        report.conversions_created,
        tenant,
        failures.len()
    );

    Ok(BestEffort::from_parts(report, failures))
}

/// Hook path used when a business is created: never fails the caller.
pub async fn seed_for_new_business(store: Arc<dyn Store>, tenant: RecordId) {
    match seed_default_units(store.as_ref(), tenant).await {
        Ok(BestEffort::Complete(_)) => {}
        Ok(BestEffort::Degraded { partial, failures }) => {
            tracing::warn!(
                "Default units for business {} seeded partially: {} units, {} conversions, {} failures",
                tenant,
                partial.units_created,
                partial.conversions_created,
                failures.len()
            );
        }
        Err(e) => tracing::warn!("Default unit seeding skipped for business {}: {}", tenant, e),
    }
}

/// Response body for the on-demand seed endpoint
pub fn report_json(outcome: &BestEffort<SeedReport>) -> Value {
    let report = outcome.value();
    let mut body = json!({
        "unitsCreated": report.units_created,
        "conversionsCreated": report.conversions_created,
        "units": report.units,
    });
    if !outcome.failures().is_empty() {
        body["failures"] = json!(outcome.failures());
    }
    body
}
