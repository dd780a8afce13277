//! HTTP routes for media endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::adapters::http::middleware::Throttles;
use crate::ports::ThrottleTier::{Delete, Long, Upload};

use super::handlers::{
    delete_user_photo, get_own_photo, get_user_photo, list_session_photos, replace_user_photo,
    request_photo_deletion, upload_session_photos, upload_user_photo, MediaHandlers,
};

/// Creates the media router. `max_body_bytes` caps a whole multipart request.
///
/// Uploads and deletions have their own tiers; reads share `Long`.
pub fn media_routes(
    handlers: MediaHandlers,
    max_body_bytes: usize,
    throttles: &Throttles,
) -> Router {
    Router::new()
        .route(
            "/media/sessions/:session_id",
            throttles
                .apply(Upload, post(upload_session_photos))
                .merge(throttles.apply(Long, get(list_session_photos))),
        )
        .route(
            "/media/sessions/:session_id/photos",
            throttles.apply(Delete, delete(request_photo_deletion)),
        )
        .route(
            "/media/user",
            throttles
                .apply(Upload, post(upload_user_photo).patch(replace_user_photo))
                .merge(throttles.apply(Delete, delete(delete_user_photo)))
                .merge(throttles.apply(Long, get(get_own_photo))),
        )
        .route(
            "/media/user/:user_id",
            throttles.apply(Long, get(get_user_photo)),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(handlers)
}
