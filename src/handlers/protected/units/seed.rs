use axum::extract::{Extension, State};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::state::AppState;
use crate::units::{bootstrap::report_json, seed_default_units};

use super::caller_business;

/// POST /api/units/seed - Seed the default unit catalog on demand
///
/// Refused with 409 when the business already has units. Individual write
/// failures do not fail the request; they are listed under `failures`.
pub async fn seed_post(State(state): State<AppState>, Extension(auth): Extension<AuthContext>) -> ApiResult<Value> {
    let business = caller_business(&auth)?;
    let outcome = seed_default_units(state.store.as_ref(), business).await?;

    let message = if outcome.is_complete() {
        "Default units seeded successfully"
    } else {
        "Default units seeded with failures"
    };
    Ok(ApiResponse::success(report_json(&outcome)).with_message(message))
}
