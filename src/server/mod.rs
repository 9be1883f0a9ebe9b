//! HTTP surface: the GraphQL endpoint plus the thin REST routes used by the
//! auth provider and the upload form.
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth;
use crate::db::Pool;
use crate::error::ShowcaseError;
use crate::media::MediaStore;

pub mod graphql;
pub mod routes;

pub use graphql::{build_schema, ShowcaseSchema};

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub schema: ShowcaseSchema,
    pub media: Arc<dyn MediaStore>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(pool: Pool, media: Arc<dyn MediaStore>, api_key: &str) -> Self {
        Self {
            schema: build_schema(pool.clone()),
            pool,
            media,
            api_key: Arc::from(api_key),
        }
    }
}

/// Rejects requests that do not present the shared API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if auth::api_key_matches(request.headers(), &state.api_key) {
        next.run(request).await
    } else {
        warn!(path = %request.uri().path(), "rejected request without valid API key");
        ShowcaseError::Unauthorized.into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/graphql", post(routes::graphql_handler))
        .route("/api/auth/sign-in", post(routes::sign_in))
        .route("/api/userId", get(routes::user_id))
        .route("/api/user-projects", get(routes::user_projects))
        .route("/api/upload", post(routes::upload))
        .route("/api/edit-project", post(routes::edit_project))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/db", get(routes::db_health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
