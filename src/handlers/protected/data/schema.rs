use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::CollectionService;
use crate::state::AppState;
use crate::types::Document;

use super::utils::ListQuery;

/// GET /api/:collection - List records visible to the caller
pub async fn list(state: AppState, auth: AuthContext, collection: &str, query: ListQuery) -> ApiResult<Vec<Document>> {
    let filter = query.into_filter(&state.config.filter)?;
    let records = CollectionService::for_slug(&state, collection)?
        .find(auth.principal(), filter)
        .await?;
    Ok(ApiResponse::success(records))
}

/// POST /api/:collection - Create one record
pub async fn create(state: AppState, auth: AuthContext, collection: &str, body: Value) -> ApiResult<Document> {
    let record = CollectionService::for_slug(&state, collection)?
        .create(auth.principal(), body)
        .await?;
    Ok(ApiResponse::created(record))
}
