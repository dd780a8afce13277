//! Top-level router: service routes, auth middleware and the tower stack.
//!
//! Rate limits are attached per route inside each service router.

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::domain::media::MAX_SESSION_PHOTOS;

use super::location::location_routes;
use super::media::media_routes;
use super::middleware::auth_middleware;
use super::session::session_routes;
use super::state::ApiState;

/// Headroom for multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Knobs for the outer layers.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    pub max_file_bytes: usize,
    /// Serves stored blobs under `/files` when set.
    pub files_dir: Option<PathBuf>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_file_bytes: crate::application::handlers::media::DEFAULT_MAX_FILE_BYTES,
            files_dir: None,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Builds the complete API router.
pub fn build_router(state: ApiState, options: &RouterOptions) -> Router {
    let max_body = options.max_file_bytes * MAX_SESSION_PHOTOS + MULTIPART_OVERHEAD_BYTES;

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(session_routes(state.sessions, &state.throttles))
        .merge(location_routes(state.locations, &state.throttles))
        .merge(media_routes(state.media, max_body, &state.throttles));

    if let Some(dir) = &options.files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(state.auth, auth_middleware))
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.cors_origins))
}
