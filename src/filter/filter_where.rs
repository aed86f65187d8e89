use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};
use crate::types::Document;

/// Where-document compiler and evaluator.
///
/// The same where document drives both backends: `generate` compiles it into a
/// parameterised SQL predicate over the JSONB `data` column, `matches`
/// evaluates it against an in-memory document.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    pub fn validate_field(field: &str) -> Result<(), FilterError> {
        let mut chars = field.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(FilterError::InvalidField(format!("Invalid field name format: {}", field))),
        }
        if !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidField(format!("Invalid field name format: {}", field)));
        }
        Ok(())
    }

    /// Every field name a where document tests, including inside `$and`, `$or` and `$not`
    pub fn referenced_fields(where_data: &Value) -> Vec<String> {
        let mut fields = Vec::new();
        Self::collect_fields(where_data, &mut fields);
        fields
    }

    fn collect_fields(where_data: &Value, fields: &mut Vec<String>) {
        let Value::Object(obj) = where_data else {
            return;
        };
        for (key, value) in obj {
            match key.as_str() {
                "$and" | "$or" => {
                    for nested in value.as_array().into_iter().flatten() {
                        Self::collect_fields(nested, fields);
                    }
                }
                "$not" => Self::collect_fields(value, fields),
                _ if key.starts_with('$') => {}
                _ => fields.push(key.clone()),
            }
        }
    }

    // ========================================
    // SQL generation
    // ========================================

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok("1=1".to_string()),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut sql_conditions = vec![];
        for (key, value) in obj {
            if key.starts_with('$') {
                sql_conditions.push(self.build_logical(key, value)?);
            } else {
                for condition in Self::parse_field_condition(key, value)? {
                    sql_conditions.push(self.build_sql_condition(&condition)?);
                }
            }
        }

        Ok(if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") })
    }

    fn build_logical(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value.as_array().ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                if arr.is_empty() {
                    return Ok(if op == "$and" { "1=1" } else { "1=0" }.to_string());
                }
                let mut sql_parts = Vec::with_capacity(arr.len());
                for v in arr {
                    sql_parts.push(format!("({})", self.build(v)?));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", sql_parts.join(joiner)))
            }
            "$not" => Ok(format!("NOT ({})", self.build(value)?)),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        Self::validate_field(field)?;
        match value {
            Value::Object(obj) if obj.keys().all(|k| k.starts_with('$')) && !obj.is_empty() => {
                let mut out = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = FilterOp::parse(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                    out.push(FilterWhereInfo { field: field.to_string(), operator, data: op_val.clone() });
                }
                Ok(out)
            }
            // Implicit equality: { field: value }
            _ => Ok(vec![FilterWhereInfo { field: field.to_string(), operator: FilterOp::Eq, data: value.clone() }]),
        }
    }

    fn column(field: &str) -> String {
        if field == "id" {
            "to_jsonb(id)".to_string()
        } else {
            format!("(data->'{}')", field)
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let column = Self::column(&condition.field);
        let data = condition.data.clone();
        Ok(match condition.operator {
            FilterOp::Eq => {
                if data.is_null() {
                    format!("({col} IS NULL OR {col} = 'null'::jsonb)", col = column)
                } else {
                    format!("{} = {}", column, self.param(data))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    format!("({col} IS NOT NULL AND {col} <> 'null'::jsonb)", col = column)
                } else {
                    format!("{} IS DISTINCT FROM {}", column, self.param(data))
                }
            }
            FilterOp::Gt => format!("{} > {}", column, self.param(data)),
            FilterOp::Gte => format!("{} >= {}", column, self.param(data)),
            FilterOp::Lt => format!("{} < {}", column, self.param(data)),
            FilterOp::Lte => format!("{} <= {}", column, self.param(data)),
            FilterOp::Like => format!("({} #>> '{{}}') LIKE ({} #>> '{{}}')", column, self.param(data)),
            FilterOp::ILike => format!("({} #>> '{{}}') ILIKE ({} #>> '{{}}')", column, self.param(data)),
            FilterOp::In | FilterOp::NIn => {
                let values = match data {
                    Value::Array(values) => values,
                    other => vec![other],
                };
                let negate = condition.operator == FilterOp::NIn;
                if values.is_empty() {
                    return Ok(if negate { "1=1" } else { "1=0" }.to_string());
                }
                let params: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
                let keyword = if negate { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, keyword, params.join(", "))
            }
            FilterOp::Exists => {
                let exists = data.as_bool().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$exists requires a boolean".to_string())
                })?;
                if exists {
                    format!("{} IS NOT NULL", column)
                } else {
                    format!("{} IS NULL", column)
                }
            }
        })
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    // ========================================
    // In-memory evaluation
    // ========================================

    /// Evaluate a where document against a single document
    pub fn matches(where_data: &Value, doc: &Document) -> Result<bool, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(true),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        for (key, value) in obj {
            let ok = match key.as_str() {
                "$and" => {
                    let arr = value.as_array().ok_or_else(|| FilterError::InvalidOperatorData("$and requires array".to_string()))?;
                    let mut all = true;
                    for v in arr {
                        if !Self::matches(v, doc)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                "$or" => {
                    let arr = value.as_array().ok_or_else(|| FilterError::InvalidOperatorData("$or requires array".to_string()))?;
                    let mut any = false;
                    for v in arr {
                        if Self::matches(v, doc)? {
                            any = true;
                            break;
                        }
                    }
                    any
                }
                "$not" => !Self::matches(value, doc)?,
                k if k.starts_with('$') => return Err(FilterError::UnsupportedOperator(k.to_string())),
                field => {
                    let mut all = true;
                    for condition in Self::parse_field_condition(field, value)? {
                        if !Self::condition_matches(&condition, doc.get(field))? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn condition_matches(condition: &FilterWhereInfo, actual: Option<&Value>) -> Result<bool, FilterError> {
        let actual = actual.filter(|v| !v.is_null());
        let expected = &condition.data;
        Ok(match condition.operator {
            FilterOp::Eq => match actual {
                None => expected.is_null(),
                Some(v) => values_equal(v, expected),
            },
            FilterOp::Ne => match actual {
                None => !expected.is_null(),
                Some(v) => !values_equal(v, expected),
            },
            FilterOp::Gt => matches!(actual.and_then(|v| compare_values(v, expected)), Some(Ordering::Greater)),
            FilterOp::Gte => matches!(
                actual.and_then(|v| compare_values(v, expected)),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => matches!(actual.and_then(|v| compare_values(v, expected)), Some(Ordering::Less)),
            FilterOp::Lte => matches!(
                actual.and_then(|v| compare_values(v, expected)),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Like | FilterOp::ILike => {
                let (Some(Value::String(text)), Value::String(pattern)) = (actual, expected) else {
                    return Ok(false);
                };
                if condition.operator == FilterOp::ILike {
                    like_match(&text.to_lowercase(), &pattern.to_lowercase())
                } else {
                    like_match(text, pattern)
                }
            }
            FilterOp::In | FilterOp::NIn => {
                let found = match (actual, expected) {
                    (Some(v), Value::Array(values)) => values.iter().any(|e| values_equal(v, e)),
                    (Some(v), other) => values_equal(v, other),
                    (None, _) => false,
                };
                if condition.operator == FilterOp::In { found } else { !found }
            }
            FilterOp::Exists => {
                let exists = expected.as_bool().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$exists requires a boolean".to_string())
                })?;
                actual.is_some() == exists
            }
        })
    }
}

/// Value equality that treats `1` and `1.0` as the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two scalar values of the same kind
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// SQL LIKE semantics: `%` matches any run, `_` matches one character
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn implicit_equality_compiles_to_jsonb_param() {
        let (sql, params) = FilterWhere::generate(&json!({ "business": 42 }), 1).unwrap();
        assert_eq!(sql, "(data->'business') = $2");
        assert_eq!(params, vec![json!(42)]);
    }

    #[test]
    fn id_field_uses_the_key_column() {
        let (sql, _) = FilterWhere::generate(&json!({ "id": { "$in": [1, 2] } }), 0).unwrap();
        assert_eq!(sql, "to_jsonb(id) IN ($1, $2)");
    }

    #[test]
    fn nested_logical_operators_keep_param_numbering() {
        let where_data = json!({
            "$and": [
                { "unit_group": "MASS" },
                { "$or": [{ "short_name": "kg" }, { "short_name": "g" }] }
            ]
        });
        let (sql, params) = FilterWhere::generate(&where_data, 1).unwrap();
        assert_eq!(
            sql,
            "(((data->'unit_group') = $2) AND ((((data->'short_name') = $3) OR ((data->'short_name') = $4))))"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn rejects_injection_in_field_names() {
        let err = FilterWhere::generate(&json!({ "name'; DROP TABLE documents; --": 1 }), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidField(_)));
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&json!({ "business": { "$in": [] } }), 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
        assert!(!FilterWhere::matches(&json!({ "business": { "$in": [] } }), &doc(json!({ "business": 1 }))).unwrap());
    }

    #[test]
    fn matches_numbers_regardless_of_representation() {
        let d = doc(json!({ "business": 42, "factor": 1000.0 }));
        assert!(FilterWhere::matches(&json!({ "business": 42.0 }), &d).unwrap());
        assert!(FilterWhere::matches(&json!({ "factor": { "$gte": 1000 } }), &d).unwrap());
        assert!(!FilterWhere::matches(&json!({ "business": 7 }), &d).unwrap());
    }

    #[test]
    fn missing_field_equals_null() {
        let d = doc(json!({ "name": "Gram" }));
        assert!(FilterWhere::matches(&json!({ "business": null }), &d).unwrap());
        assert!(!FilterWhere::matches(&json!({ "business": { "$exists": true } }), &d).unwrap());
    }

    #[test]
    fn like_patterns() {
        assert!(like_match("kilogram", "kilo%"));
        assert!(like_match("kilogram", "%gram"));
        assert!(like_match("kg", "k_"));
        assert!(!like_match("kg", "k"));
        let d = doc(json!({ "name": "Kilogram" }));
        assert!(FilterWhere::matches(&json!({ "name": { "$ilike": "kilo%" } }), &d).unwrap());
        assert!(!FilterWhere::matches(&json!({ "name": { "$like": "kilo%" } }), &d).unwrap());
    }

    #[test]
    fn or_and_not_evaluate() {
        let d = doc(json!({ "unit_group": "MASS", "is_base_unit": true }));
        assert!(FilterWhere::matches(
            &json!({ "$or": [{ "unit_group": "LENGTH" }, { "is_base_unit": true }] }),
            &d
        )
        .unwrap());
        assert!(!FilterWhere::matches(&json!({ "$not": { "unit_group": "MASS" } }), &d).unwrap());
    }
}
