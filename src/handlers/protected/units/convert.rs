use axum::extract::{Extension, Json, State};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::state::AppState;
use crate::units::{Conversion, UnitConverter};

use super::caller_business;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Unit id or short name
    pub from_unit: Value,
    pub to_unit: Value,
    pub quantity: f64,
}

/// POST /api/units/convert - Convert a quantity between two units of the caller's business
pub async fn convert_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ConvertRequest>,
) -> ApiResult<Conversion> {
    let business = caller_business(&auth)?;
    let conversion = UnitConverter::new(state.store.as_ref(), business)
        .convert(&request.from_unit, &request.to_unit, request.quantity)
        .await?;
    Ok(ApiResponse::success(conversion))
}
