// handlers/public/auth/register.rs - POST /api/register handler

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::{RegisterRequest, TenantService};
use crate::state::AppState;

/// POST /api/register - Self-service business registration
///
/// Expected Input:
/// ```json
/// {
///   "businessName": "Corner Shop",
///   "email": "owner@shop.test",
///   "password": "secret",
///   "country": "KE",
///   "city": "Nairobi",
///   "firstName": "Ada"
/// }
/// ```
///
/// Creates the business (which seeds its default units), an admin user and
/// a profile. Responds `201 { success, message, businessId, userId }`.
pub async fn register_post(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registration = TenantService::new(&state)?.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Business registered successfully",
            "businessId": registration.business_id,
            "userId": registration.user_id,
        })),
    ))
}
