use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::CollectionService;
use crate::state::AppState;
use crate::types::{Document, RecordId};

/// GET /api/:collection/:id - Show one record
pub async fn get(state: AppState, auth: AuthContext, collection: &str, id: RecordId) -> ApiResult<Document> {
    let record = CollectionService::for_slug(&state, collection)?.get(auth.principal(), id).await?;
    Ok(ApiResponse::success(record))
}

/// PATCH /api/:collection/:id - Merge changes into one record
pub async fn patch(state: AppState, auth: AuthContext, collection: &str, id: RecordId, changes: Value) -> ApiResult<Document> {
    let record = CollectionService::for_slug(&state, collection)?
        .update(auth.principal(), id, changes)
        .await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/:collection/:id - Delete one record, returning what was removed
pub async fn delete(state: AppState, auth: AuthContext, collection: &str, id: RecordId) -> ApiResult<Document> {
    let record = CollectionService::for_slug(&state, collection)?
        .delete(auth.principal(), id)
        .await?;
    Ok(ApiResponse::success(record))
}
