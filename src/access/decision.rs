use serde_json::Value;

use crate::filter::FilterData;

/// Outcome of an access predicate.
///
/// `FilterBy` carries a where document that the store applies as part of the
/// query; it is never evaluated as a post-filter over unscoped results.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allow,
    Deny,
    FilterBy(Value),
}

impl AccessDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Deny)
    }

    /// Constrain a query with this decision; `None` when denied
    pub fn scope(&self, filter: FilterData) -> Option<FilterData> {
        match self {
            AccessDecision::Allow => Some(filter),
            AccessDecision::Deny => None,
            AccessDecision::FilterBy(where_data) => Some(filter.and_where(where_data.clone())),
        }
    }
}
