use axum::extract::{Extension, Path, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::state::AppState;
use crate::units::{Unit, UnitConverter, UnitGroup};

use super::caller_business;

/// GET /api/units/groups - Unit groups that have units in the caller's business
pub async fn groups_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Vec<UnitGroup>> {
    let business = caller_business(&auth)?;
    let groups = UnitConverter::new(state.store.as_ref(), business).groups_in_use().await?;
    Ok(ApiResponse::success(groups))
}

/// GET /api/units/groups/:group - Units of one group, ordered by name
pub async fn group_units_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(group): Path<String>,
) -> ApiResult<Vec<Unit>> {
    let business = caller_business(&auth)?;
    let group: UnitGroup = group.parse().map_err(ApiError::bad_request)?;
    let units = UnitConverter::new(state.store.as_ref(), business).units_in_group(group).await?;
    Ok(ApiResponse::success(units))
}
