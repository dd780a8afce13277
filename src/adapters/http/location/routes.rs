//! HTTP routes for location endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::Throttles;
use crate::ports::ThrottleTier::{Long, Medium};

use super::handlers::{
    create_user_location, delete_user_location, find_nearest_sessions, get_session_location,
    get_user_location, update_user_location, LocationHandlers,
};

/// Creates the location router.
///
/// `/sessions/nearest` lives here because the spatial index belongs to the
/// location store; it takes priority over `/sessions/:id` when merged.
pub fn location_routes(handlers: LocationHandlers, throttles: &Throttles) -> Router {
    Router::new()
        .route(
            "/location/user",
            throttles
                .apply(
                    Medium,
                    post(create_user_location)
                        .patch(update_user_location)
                        .delete(delete_user_location),
                )
                .merge(throttles.apply(Long, get(get_user_location))),
        )
        .route(
            "/location/sessions/:session_id",
            throttles.apply(Long, get(get_session_location)),
        )
        .route(
            "/sessions/nearest",
            throttles.apply(Long, get(find_nearest_sessions)),
        )
        .with_state(handlers)
}
