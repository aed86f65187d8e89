use axum::extract::{Extension, State};
use serde_json::{json, Value};

use crate::collections::USERS;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::CollectionService;
use crate::state::AppState;

/// GET /api/users/me - The authenticated user and their resolved access
pub async fn whoami_get(State(state): State<AppState>, Extension(auth): Extension<AuthContext>) -> ApiResult<Value> {
    let principal = auth.principal().ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let user = state
        .store
        .find_by_id(USERS, principal.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User for this token no longer exists"))?;
    let user = CollectionService::for_slug(&state, USERS)?.present(user);

    Ok(ApiResponse::success(json!({
        "user": user,
        "business": principal.tenant_id(),
        "roles": principal.roles,
        "platformAdmin": principal.platform_admin,
    })))
}
