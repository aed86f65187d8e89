use axum::extract::{Extension, Json, State};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::TenantService;
use crate::state::AppState;
use crate::types::Document;

/// GET /api/business/me - The caller's own business
pub async fn me_get(State(state): State<AppState>, Extension(auth): Extension<AuthContext>) -> ApiResult<Document> {
    let business = TenantService::new(&state)?.current_business(auth.principal()).await?;
    Ok(ApiResponse::success(business))
}

/// PATCH /api/business/me - Update the caller's own business
///
/// `id`, `createdAt` and `updatedAt` in the body are ignored.
pub async fn me_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(changes): Json<Value>,
) -> ApiResult<Document> {
    let business = TenantService::new(&state)?
        .update_current_business(auth.principal(), changes)
        .await?;
    Ok(ApiResponse::success(business).with_message("Business updated successfully"))
}
