use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::filter_where::{compare_values, FilterWhere};
use super::types::{FilterOrderInfo, SortDirection};
use crate::types::Document;

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["createdAt desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    if let Value::String(s) = v { out.extend(Self::parse_order_string(s)); }
                }
                out
            }
            Value::Object(obj) => {
                // { "createdAt": "desc", "name": "asc" }
                obj.iter()
                    .map(|(k, v)| {
                        let sort = match v.as_str().unwrap_or("asc").to_ascii_lowercase().as_str() {
                            "desc" => SortDirection::Desc,
                            _ => SortDirection::Asc,
                        };
                        FilterOrderInfo { field: k.clone(), sort }
                    })
                    .collect()
            }
            _ => vec![],
        };
        for info in &infos {
            FilterWhere::validate_field(&info.field)?;
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        // split on commas, then each token into field and direction; "-field" means descending
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let (col, mut sort) = match col.strip_prefix('-') {
                    Some(stripped) => (stripped, SortDirection::Desc),
                    None => (col, SortDirection::Asc),
                };
                if let Some(dir) = it.next() {
                    sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                }
                out.push(FilterOrderInfo { field: col.to_string(), sort });
            }
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return "ORDER BY id ASC".to_string(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| {
                if i.field == "id" {
                    format!("id {}", i.sort.to_sql())
                } else {
                    format!("(data->'{}') {}", i.field, i.sort.to_sql())
                }
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Sort documents in place; documents without the field sort last
    pub fn sort(docs: &mut [Document], infos: &[FilterOrderInfo]) {
        docs.sort_by(|a, b| {
            for info in infos {
                let ord = match (a.get(&info.field), b.get(&info.field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                let ord = if info.sort == SortDirection::Desc { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dash_prefix_as_descending() {
        let infos = FilterOrder::validate_and_parse(&json!("-createdAt, name")).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].field, "createdAt");
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].sort, SortDirection::Asc);
    }

    #[test]
    fn generates_jsonb_order_clause() {
        let infos = FilterOrder::validate_and_parse(&json!({ "name": "desc" })).unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY (data->'name') DESC");
    }

    #[test]
    fn sorts_documents_by_field() {
        let mut docs: Vec<Document> = vec![
            json!({ "id": 1, "name": "g" }).as_object().cloned().unwrap(),
            json!({ "id": 2, "name": "cm" }).as_object().cloned().unwrap(),
            json!({ "id": 3 }).as_object().cloned().unwrap(),
        ];
        let infos = FilterOrder::validate_and_parse(&json!("name asc")).unwrap();
        FilterOrder::sort(&mut docs, &infos);
        assert_eq!(docs[0]["id"], json!(2));
        assert_eq!(docs[1]["id"], json!(1));
        assert_eq!(docs[2]["id"], json!(3));
    }
}
