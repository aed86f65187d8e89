// handlers/mod.rs - Two-tier handler layout
//
// Public (no token needed) → Protected (acts for the resolved caller).
// Tenant scoping is not decided here; the services apply it.

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod protected;
pub mod public;

/// GET / - API information
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tillstock API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant point-of-sale and inventory backend",
            "endpoints": {
                "register": "/api/register (public)",
                "login": "/api/users/login (public)",
                "me": "/api/users/me (protected)",
                "business": "/api/business/me (protected)",
                "units": "/api/units/seed, /api/units/convert, /api/units/groups[/:group] (protected)",
                "data": "/api/:collection[/:id] (protected)",
                "health": "/health (public)",
            }
        }
    }))
}

/// GET /health - Store connectivity
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
