use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,

    #[serde(rename = "$like")] Like,
    #[serde(rename = "$ilike")] ILike,

    #[serde(rename = "$in")] In,
    #[serde(rename = "$nin")] NIn,

    #[serde(rename = "$exists")] Exists,
}

impl FilterOp {
    pub fn parse(op_key: &str) -> Option<Self> {
        Some(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$exists" => FilterOp::Exists,
            _ => return None,
        })
    }
}

/// Query description handed to the store: where document, ordering and paging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(rename = "where")]
    pub where_clause: Option<Value>,
    pub order: Option<Value>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl FilterData {
    /// Filter matching every document where each `field == value`
    pub fn by_fields<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut map = serde_json::Map::new();
        for (k, v) in pairs {
            map.insert(k.into(), v);
        }
        Self {
            where_clause: Some(Value::Object(map)),
            ..Default::default()
        }
    }

    /// Constrain this filter with an additional where document (AND semantics)
    pub fn and_where(mut self, extra: Value) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            None | Some(Value::Null) => extra,
            Some(existing) => json!({ "$and": [existing, extra] }),
        });
        self
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Field names used by the where document and the ordering
    pub fn referenced_fields(&self) -> Result<Vec<String>, FilterError> {
        let mut fields = match &self.where_clause {
            Some(where_data) => FilterWhere::referenced_fields(where_data),
            None => Vec::new(),
        };
        if let Some(order) = &self.order {
            fields.extend(FilterOrder::validate_and_parse(order)?.into_iter().map(|info| info.field));
        }
        Ok(fields)
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_fields_walk_nested_logic_and_ordering() {
        let filter = FilterData {
            where_clause: Some(json!({
                "name": { "$like": "Ri%" },
                "$or": [{ "sku": "A1" }, { "$not": { "password_hash": { "$exists": true } } }]
            })),
            order: Some(json!("createdAt desc")),
            ..Default::default()
        };
        let mut fields = filter.referenced_fields().unwrap();
        fields.sort();
        assert_eq!(fields, vec!["createdAt", "name", "password_hash", "sku"]);
    }

    #[test]
    fn and_where_wraps_existing_clause() {
        let filter = FilterData::by_fields([("name", json!("Flour"))]).and_where(json!({ "business": 7 }));
        assert_eq!(
            filter.where_clause,
            Some(json!({ "$and": [{ "name": "Flour" }, { "business": 7 }] }))
        );
    }

    #[test]
    fn and_where_on_empty_filter_is_the_extra_clause() {
        let filter = FilterData::default().and_where(json!({ "business": 7 }));
        assert_eq!(filter.where_clause, Some(json!({ "business": 7 })));
    }
}
