//! Generic CRUD over the declared collections.
//!
//! Each declared collection gets its own static routes (see `routes`), so
//! collection names never compete with fixed paths like `/api/units/seed`.

use axum::{
    extract::{Extension, Json, Path, Query, State},
    routing::get,
    Router,
};
use serde_json::Value;

use crate::collections::CollectionSchema;
use crate::middleware::AuthContext;
use crate::state::AppState;
use crate::types::RecordId;

pub mod record;
pub mod schema;
pub mod utils;

pub use utils::ListQuery;

/// `/api/<slug>` and `/api/<slug>/:id` for one collection
pub fn routes(collection: &'static CollectionSchema) -> Router<AppState> {
    let slug = collection.slug;

    Router::new()
        .route(
            &format!("/api/{}", slug),
            get(
                move |State(state): State<AppState>,
                      Extension(auth): Extension<AuthContext>,
                      Query(query): Query<ListQuery>| async move { schema::list(state, auth, slug, query).await },
            )
            .post(
                move |State(state): State<AppState>,
                      Extension(auth): Extension<AuthContext>,
                      Json(body): Json<Value>| async move { schema::create(state, auth, slug, body).await },
            ),
        )
        .route(
            &format!("/api/{}/:id", slug),
            get(
                move |State(state): State<AppState>,
                      Extension(auth): Extension<AuthContext>,
                      Path(id): Path<RecordId>| async move { record::get(state, auth, slug, id).await },
            )
            .patch(
                move |State(state): State<AppState>,
                      Extension(auth): Extension<AuthContext>,
                      Path(id): Path<RecordId>,
                      Json(changes): Json<Value>| async move { record::patch(state, auth, slug, id, changes).await },
            )
            .delete(
                move |State(state): State<AppState>,
                      Extension(auth): Extension<AuthContext>,
                      Path(id): Path<RecordId>| async move { record::delete(state, auth, slug, id).await },
            ),
        )
}
