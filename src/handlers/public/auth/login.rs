// handlers/public/auth/login.rs - POST /api/users/login handler

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, verify_password};
use crate::collections::USERS;
use crate::database::document_id;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CollectionService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users/login - Verify credentials and issue a session token
///
/// Every credential failure answers the same 401 so the response does not
/// reveal whether the email is registered.
pub async fn login_post(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<Value> {
    let invalid = || ApiError::unauthorized("Invalid email or password");
    let email = request.email.trim().to_lowercase();

    let user = state
        .store
        .find_one(USERS, FilterData::by_fields([("email", json!(email))]))
        .await?
        .ok_or_else(invalid)?;

    let hash = user.get("password_hash").and_then(Value::as_str).ok_or_else(invalid)?;
    if !verify_password(&request.password, hash)? {
        tracing::info!("Failed login for {}", email);
        return Err(invalid());
    }

    let user_id = document_id(&user).ok_or_else(invalid)?;
    let token = issue_token(user_id, &email, &state.config.security)?;
    tracing::info!("User {} logged in", user_id);

    let user = CollectionService::for_slug(&state, USERS)?.present(user);
    Ok(ApiResponse::success(json!({
        "token": token,
        "user": user,
        "expires_in": state.config.security.jwt_expiry_hours * 3600,
    })))
}
