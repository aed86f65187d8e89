use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::document_tenant;
use crate::types::{Document, RecordId};

/// Physical dimension a unit measures; conversions only make sense inside one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitGroup {
    Mass,
    Length,
    Volume,
    Area,
    Count,
    Time,
    Other,
}

impl UnitGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitGroup::Mass => "MASS",
            UnitGroup::Length => "LENGTH",
            UnitGroup::Volume => "VOLUME",
            UnitGroup::Area => "AREA",
            UnitGroup::Count => "COUNT",
            UnitGroup::Time => "TIME",
            UnitGroup::Other => "OTHER",
        }
    }
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MASS" => Ok(UnitGroup::Mass),
            "LENGTH" => Ok(UnitGroup::Length),
            "VOLUME" => Ok(UnitGroup::Volume),
            "AREA" => Ok(UnitGroup::Area),
            "COUNT" => Ok(UnitGroup::Count),
            "TIME" => Ok(UnitGroup::Time),
            "OTHER" => Ok(UnitGroup::Other),
            other => Err(format!("unknown unit group '{}'", other)),
        }
    }
}

/// A unit of measure owned by one business
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: RecordId,
    pub business: Option<RecordId>,
    pub name: String,
    pub short_name: String,
    pub unit_group: UnitGroup,
    pub is_base_unit: bool,
    pub allow_decimal: bool,
}

impl Unit {
    /// Read a stored unit document; `None` when it lacks an id, a short name or a known group
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.get("id").and_then(Value::as_i64)?,
            business: document_tenant(doc),
            name: doc.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            short_name: doc.get("short_name").and_then(Value::as_str)?.to_string(),
            unit_group: doc.get("unit_group").and_then(Value::as_str)?.parse().ok()?,
            is_base_unit: doc.get("is_base_unit").and_then(Value::as_bool).unwrap_or(false),
            allow_decimal: doc.get("allow_decimal").and_then(Value::as_bool).unwrap_or(true),
        })
    }
}

/// Directed conversion edge: `qty_to = qty_from * factor`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversion {
    pub id: RecordId,
    pub business: Option<RecordId>,
    pub from_unit: RecordId,
    pub to_unit: RecordId,
    pub factor: f64,
}

impl UnitConversion {
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.get("id").and_then(Value::as_i64)?,
            business: document_tenant(doc),
            from_unit: doc.get("from_unit").and_then(Value::as_i64)?,
            to_unit: doc.get("to_unit").and_then(Value::as_i64)?,
            factor: doc.get("factor").and_then(Value::as_f64)?,
        })
    }

    /// Zero, negative and non-finite factors are treated as missing edges
    pub fn is_usable(&self) -> bool {
        self.factor.is_finite() && self.factor > 0.0
    }
}
