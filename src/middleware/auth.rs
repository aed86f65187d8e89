use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::access::Principal;
use crate::auth::{validate_jwt, Claims};
use crate::collections::{PLATFORM_ADMINS, USERS};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::state::AppState;

/// Caller resolved for the current request; `None` when no token was sent
#[derive(Clone, Debug, Default)]
pub struct AuthContext(pub Option<Principal>);

impl AuthContext {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Optional-auth middleware: a request without a bearer token continues
/// anonymously, a request with a bad token is rejected with 401.
pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = match extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)? {
        None => AuthContext(None),
        Some(token) => {
            let claims = validate_jwt(&token, &state.config.security.jwt_secret)?;
            AuthContext(Some(load_principal(&state, &claims).await?))
        }
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Load the token subject and their platform admin standing from the store
async fn load_principal(state: &AppState, claims: &Claims) -> Result<Principal, ApiError> {
    let user = state
        .store
        .find_by_id(USERS, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User for this token no longer exists"))?;

    let platform_admin = state
        .store
        .exists(
            PLATFORM_ADMINS,
            FilterData::by_fields([("user", json!(claims.sub)), ("is_active", json!(true))]),
        )
        .await?;

    let principal = Principal::from_user_document(&user, platform_admin)
        .ok_or_else(|| ApiError::unauthorized("User for this token is malformed"))?;
    tracing::trace!("Resolved principal {} (business {:?})", principal.user_id, principal.tenant_id());
    Ok(principal)
}

/// Extract the bearer token, if any, from the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
