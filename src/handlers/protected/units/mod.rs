// handlers/protected/units - Unit catalog operations for the caller's business
//
// Every handler here works inside exactly one business: the caller's own.

use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::types::RecordId;

pub mod convert;
pub mod groups;
pub mod seed;

pub use convert::convert_post;
pub use groups::{group_units_get, groups_get};
pub use seed::seed_post;

/// The business the caller acts for: 401 when anonymous, 404 without a business
fn caller_business(auth: &AuthContext) -> Result<RecordId, ApiError> {
    let principal = auth.principal().ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    principal
        .tenant_id()
        .ok_or_else(|| ApiError::not_found("No business is associated with this account"))
}
