use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::model::{Unit, UnitConversion, UnitGroup};
use crate::access::TENANT_FIELD;
use crate::collections::{UNITS, UNIT_CONVERSIONS};
use crate::database::{Store, StoreError};
use crate::filter::FilterData;
use crate::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    /// Same group, but neither a direct nor a reverse edge exists
    NoPath,
    /// The units measure different dimensions
    GroupMismatch,
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("Unit not found: {0}")]
    NotFound(String),

    #[error("No conversion available from '{from}' to '{to}'")]
    ConversionUnavailable {
        from: String,
        to: String,
        reason: UnavailableReason,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which edge produced a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionDirection {
    Identity,
    Direct,
    Reverse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub from_unit: Unit,
    pub to_unit: Unit,
    pub quantity: f64,
    pub result: f64,
    /// Effective multiplier: `result = quantity * factor`
    pub factor: f64,
    pub direction: ConversionDirection,
}

/// The edge chosen for `from -> to`, with the stored factor it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEdge {
    pub direction: ConversionDirection,
    edge_factor: f64,
}

impl ResolvedEdge {
    /// Effective multiplier: `result = quantity * factor`
    pub fn factor(&self) -> f64 {
        match self.direction {
            ConversionDirection::Reverse => 1.0 / self.edge_factor,
            _ => self.edge_factor,
        }
    }

    pub fn apply(&self, quantity: f64) -> f64 {
        match self.direction {
            ConversionDirection::Reverse => quantity / self.edge_factor,
            _ => quantity * self.edge_factor,
        }
    }
}

/// Pick the edge for `from -> to`: a direct edge wins over a reverse one
pub fn resolve_edge(from: RecordId, to: RecordId, edges: &[UnitConversion]) -> Option<ResolvedEdge> {
    if from == to {
        return Some(ResolvedEdge { direction: ConversionDirection::Identity, edge_factor: 1.0 });
    }
    let usable = || edges.iter().filter(|e| e.is_usable());
    if let Some(edge) = usable().find(|e| e.from_unit == from && e.to_unit == to) {
        return Some(ResolvedEdge { direction: ConversionDirection::Direct, edge_factor: edge.factor });
    }
    usable()
        .find(|e| e.from_unit == to && e.to_unit == from)
        .map(|edge| ResolvedEdge { direction: ConversionDirection::Reverse, edge_factor: edge.factor })
}

/// Unit lookups and conversions for one business
pub struct UnitConverter<'a> {
    store: &'a dyn Store,
    tenant: RecordId,
}

impl<'a> UnitConverter<'a> {
    pub fn new(store: &'a dyn Store, tenant: RecordId) -> Self {
        Self { store, tenant }
    }

    fn scoped(&self, where_data: Value) -> FilterData {
        FilterData::by_fields([(TENANT_FIELD, json!(self.tenant))]).and_where(where_data)
    }

    /// Resolve a unit reference (numeric id or short name) within this business
    pub async fn resolve_unit(&self, reference: &Value) -> Result<Unit, UnitError> {
        let where_data = match reference {
            Value::Number(n) => json!({ "id": n }),
            Value::String(s) => match s.trim().parse::<RecordId>() {
                Ok(id) => json!({ "id": id }),
                Err(_) => json!({ "short_name": s.trim() }),
            },
            other => return Err(UnitError::NotFound(other.to_string())),
        };

        let doc = self
            .store
            .find_one(UNITS, self.scoped(where_data))
            .await?
            .ok_or_else(|| UnitError::NotFound(display_ref(reference)))?;

        Unit::from_document(&doc).ok_or_else(|| UnitError::NotFound(display_ref(reference)))
    }

    /// Edges in either direction between two units of this business
    async fn edges_between(&self, a: RecordId, b: RecordId) -> Result<Vec<UnitConversion>, UnitError> {
        let where_data = json!({
            "$or": [
                { "from_unit": a, "to_unit": b },
                { "from_unit": b, "to_unit": a }
            ]
        });
        let docs = self.store.find(UNIT_CONVERSIONS, self.scoped(where_data)).await?;
        Ok(docs.iter().filter_map(UnitConversion::from_document).collect())
    }

    /// Convert a quantity between two units of this business.
    ///
    /// Identity, then a direct edge, then a reverse edge; no multi-hop search.
    /// Units from different groups fail fast without looking at edges.
    pub async fn convert(&self, from: &Value, to: &Value, quantity: f64) -> Result<Conversion, UnitError> {
        if !quantity.is_finite() {
            return Err(UnitError::InvalidQuantity(quantity.to_string()));
        }

        let from_unit = self.resolve_unit(from).await?;
        let to_unit = self.resolve_unit(to).await?;

        if from_unit.unit_group != to_unit.unit_group {
            tracing::debug!(
                "conversion {} -> {} rejected: {} vs {}",
                from_unit.short_name,
                to_unit.short_name,
                from_unit.unit_group,
                to_unit.unit_group
            );
            return Err(UnitError::ConversionUnavailable {
                from: from_unit.short_name,
                to: to_unit.short_name,
                reason: UnavailableReason::GroupMismatch,
            });
        }

        let edges = if from_unit.id == to_unit.id {
            Vec::new()
        } else {
            self.edges_between(from_unit.id, to_unit.id).await?
        };

        let edge = resolve_edge(from_unit.id, to_unit.id, &edges).ok_or_else(|| {
            UnitError::ConversionUnavailable {
                from: from_unit.short_name.clone(),
                to: to_unit.short_name.clone(),
                reason: UnavailableReason::NoPath,
            }
        })?;

        Ok(Conversion {
            from_unit,
            to_unit,
            quantity,
            result: edge.apply(quantity),
            factor: edge.factor(),
            direction: edge.direction,
        })
    }

    /// Units of one group, ordered by name
    pub async fn units_in_group(&self, group: UnitGroup) -> Result<Vec<Unit>, UnitError> {
        let filter = FilterData {
            order: Some(json!("name")),
            ..self.scoped(json!({ "unit_group": group.as_str() }))
        };
        let docs = self.store.find(UNITS, filter).await?;
        Ok(docs.iter().filter_map(Unit::from_document).collect())
    }

    /// Groups that have at least one unit in this business
    pub async fn groups_in_use(&self) -> Result<Vec<UnitGroup>, UnitError> {
        let docs = self.store.find(UNITS, FilterData::by_fields([(TENANT_FIELD, json!(self.tenant))])).await?;
        let groups: BTreeSet<UnitGroup> = docs.iter().filter_map(Unit::from_document).map(|u| u.unit_group).collect();
        Ok(groups.into_iter().collect())
    }
}

fn display_ref(reference: &Value) -> String {
    match reference {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::types::Document;

    fn edge(from: RecordId, to: RecordId, factor: f64) -> UnitConversion {
        UnitConversion { id: 0, business: Some(42), from_unit: from, to_unit: to, factor }
    }

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    fn convert(quantity: f64, from: RecordId, to: RecordId, edges: &[UnitConversion]) -> Option<f64> {
        resolve_edge(from, to, edges).map(|edge| edge.apply(quantity))
    }

    #[test]
    fn identity_direct_and_reverse() {
        let edges = vec![edge(1, 2, 1000.0)];
        assert_eq!(convert(7.0, 1, 1, &edges), Some(7.0));
        assert_eq!(convert(2.5, 1, 2, &edges), Some(2500.0));
        assert_eq!(convert(2500.0, 2, 1, &edges), Some(2.5));
        assert_eq!(convert(1.0, 1, 3, &edges), None);

        let reverse = resolve_edge(2, 1, &edges).unwrap();
        assert_eq!(reverse.direction, ConversionDirection::Reverse);
        assert_eq!(reverse.factor(), 0.001);
    }

    #[test]
    fn direct_edge_wins_over_reverse() {
        let edges = vec![edge(2, 1, 0.5), edge(1, 2, 3.0)];
        let chosen = resolve_edge(1, 2, &edges).unwrap();
        assert_eq!(chosen.direction, ConversionDirection::Direct);
        assert_eq!(chosen.factor(), 3.0);
    }

    #[test]
    fn zero_factor_edge_is_ignored() {
        let edges = vec![edge(1, 2, 0.0)];
        assert_eq!(convert(5.0, 2, 1, &edges), None);
    }

    #[test]
    fn no_transitive_closure() {
        let edges = vec![edge(1, 2, 10.0), edge(2, 3, 10.0)];
        assert_eq!(convert(1.0, 1, 3, &edges), None);
    }

    async fn seeded_store() -> (MemoryStore, RecordId, RecordId, RecordId) {
        let store = MemoryStore::new();
        let kg = store
            .insert(UNITS, doc(json!({ "business": 42, "name": "Kilogram", "short_name": "kg", "unit_group": "MASS" })))
            .await
            .unwrap();
        let g = store
            .insert(UNITS, doc(json!({ "business": 42, "name": "Gram", "short_name": "g", "unit_group": "MASS" })))
            .await
            .unwrap();
        let mm = store
            .insert(UNITS, doc(json!({ "business": 42, "name": "Millimeter", "short_name": "mm", "unit_group": "LENGTH" })))
            .await
            .unwrap();
        let (kg, g, mm) = (kg["id"].as_i64().unwrap(), g["id"].as_i64().unwrap(), mm["id"].as_i64().unwrap());
        store
            .insert(UNIT_CONVERSIONS, doc(json!({ "business": 42, "from_unit": kg, "to_unit": g, "factor": 1000.0 })))
            .await
            .unwrap();
        (store, kg, g, mm)
    }

    #[tokio::test]
    async fn converts_by_short_name_and_id() {
        let (store, kg, g, _) = seeded_store().await;
        let converter = UnitConverter::new(&store, 42);

        let c = converter.convert(&json!("kg"), &json!("g"), 2.5).await.unwrap();
        assert_eq!(c.result, 2500.0);
        assert_eq!(c.direction, ConversionDirection::Direct);

        let back = converter.convert(&json!(g), &json!(kg), c.result).await.unwrap();
        assert!((back.result - 2.5).abs() < 1e-9);
        assert_eq!(back.direction, ConversionDirection::Reverse);
    }

    #[tokio::test]
    async fn cross_group_is_unavailable() {
        let (store, _, _, _) = seeded_store().await;
        let converter = UnitConverter::new(&store, 42);
        let err = converter.convert(&json!("mm"), &json!("kg"), 5.0).await.unwrap_err();
        assert!(matches!(
            err,
            UnitError::ConversionUnavailable { reason: UnavailableReason::GroupMismatch, .. }
        ));
    }

    #[tokio::test]
    async fn units_of_other_businesses_are_not_found() {
        let (store, _, _, _) = seeded_store().await;
        let converter = UnitConverter::new(&store, 7);
        assert!(matches!(converter.convert(&json!("kg"), &json!("g"), 1.0).await, Err(UnitError::NotFound(_))));
    }

    #[tokio::test]
    async fn groups_in_use_are_distinct_and_sorted() {
        let (store, _, _, _) = seeded_store().await;
        let converter = UnitConverter::new(&store, 42);
        assert_eq!(converter.groups_in_use().await.unwrap(), vec![UnitGroup::Mass, UnitGroup::Length]);
        let mass = converter.units_in_group(UnitGroup::Mass).await.unwrap();
        let names: Vec<_> = mass.iter().map(|u| u.short_name.as_str()).collect();
        assert_eq!(names, vec!["g", "kg"]);
    }
}
