//! HTTP routes for session endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::adapters::http::middleware::Throttles;
use crate::ports::ThrottleTier::{Long, Medium};

use super::handlers::{
    create_session, delete_session, get_session, list_sessions, update_session, SessionHandlers,
};

/// Creates the session router with all endpoints.
///
/// Reads sit in the `Long` tier, trainer writes in `Medium`.
pub fn session_routes(handlers: SessionHandlers, throttles: &Throttles) -> Router {
    Router::new()
        .route(
            "/sessions",
            throttles
                .apply(Medium, post(create_session))
                .merge(throttles.apply(Long, get(list_sessions))),
        )
        .route(
            "/sessions/:id",
            throttles
                .apply(Medium, patch(update_session).delete(delete_session))
                .merge(throttles.apply(Long, get(get_session))),
        )
        .with_state(handlers)
}
