use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::collections;
use crate::config::{AppConfig, Environment};
use crate::handlers::{self, protected, public};
use crate::middleware::resolve_principal;
use crate::state::AppState;

/// Build the full HTTP router over the given state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.api.max_request_size_bytes);

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(public_routes())
        // Caller-scoped API
        .merge(auth_routes())
        .merge(business_routes())
        .merge(unit_routes())
        .merge(data_routes())
        // Every route sees the resolved caller (or none)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_principal))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/register", post(auth::register_post))
        .route("/api/users/login", post(auth::login_post))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/users/me", get(auth::whoami_get))
}

fn business_routes() -> Router<AppState> {
    use protected::business;

    Router::new().route("/api/business/me", get(business::me_get).patch(business::me_patch))
}

fn unit_routes() -> Router<AppState> {
    use protected::units;

    Router::new()
        .route("/api/units/seed", post(units::seed_post))
        .route("/api/units/convert", post(units::convert_post))
        .route("/api/units/groups", get(units::groups_get))
        .route("/api/units/groups/:group", get(units::group_units_get))
}

/// Static routes for every declared collection
fn data_routes() -> Router<AppState> {
    collections::all()
        .iter()
        .fold(Router::new(), |router, collection| router.merge(protected::data::routes(collection)))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
