use serde::Deserialize;
use serde_json::Value;

use crate::config::FilterConfig;
use crate::error::ApiError;
use crate::filter::{FilterData, FilterOrder, FilterWhere};

/// List query string: `?where=<json>&sort=<field [asc|desc]>&limit=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// JSON-encoded where document
    #[serde(rename = "where")]
    pub where_json: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i32>,
    /// 1-based page number
    pub page: Option<i32>,
}

impl ListQuery {
    pub fn into_filter(self, config: &FilterConfig) -> Result<FilterData, ApiError> {
        let where_clause = match self.where_json.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let parsed: Value =
                    serde_json::from_str(raw).map_err(|e| ApiError::invalid_json(format!("Invalid where: {}", e)))?;
                FilterWhere::validate(&parsed)?;
                Some(parsed)
            }
            None => None,
        };

        let order = match self.sort.filter(|s| !s.trim().is_empty()) {
            Some(sort) => {
                let order = Value::String(sort);
                FilterOrder::validate_and_parse(&order)?;
                Some(order)
            }
            None => None,
        };

        let limit = self.limit.unwrap_or(config.default_limit);
        if limit < 0 {
            return Err(ApiError::bad_request("limit must be non-negative"));
        }
        let limit = config.max_limit.map_or(limit, |max| limit.min(max));
        let page = self.page.unwrap_or(1).max(1);

        Ok(FilterData {
            where_clause,
            order,
            limit: Some(limit),
            offset: Some((page - 1).saturating_mul(limit)),
        })
    }
}
