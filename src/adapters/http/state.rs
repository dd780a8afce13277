//! Wiring of application handlers into the per-router handler sets.

use std::sync::Arc;

use crate::application::handlers::location::{
    CreateUserLocationHandler, DeleteUserLocationHandler, FindNearestSessionsHandler,
    GetLocationHandler, UpdateUserLocationHandler,
};
use crate::application::handlers::media::{
    DeleteUserPhotoHandler, GetUserPhotoHandler, ListSessionPhotosHandler, MediaSettings,
    ReplaceUserPhotoHandler, RequestPhotoDeletionHandler, UploadSessionPhotosHandler,
    UploadUserPhotoHandler,
};
use crate::application::handlers::session::{
    CreateSessionHandler, DeleteSessionHandler, GetSessionHandler, ListSessionsHandler,
    UpdateSessionHandler,
};
use crate::ports::{
    EventPublisher, LocationRepository, ObjectStorage, PhotoRepository, SessionRepository,
};

use super::location::LocationHandlers;
use super::media::MediaHandlers;
use super::middleware::{AuthState, RateLimiterState, Throttles};
use super::session::SessionHandlers;

/// Everything the HTTP surface needs.
#[derive(Clone)]
pub struct ApiState {
    pub sessions: SessionHandlers,
    pub locations: LocationHandlers,
    pub media: MediaHandlers,
    pub auth: AuthState,
    pub throttles: Throttles,
}

/// Ports backing the three services.
pub struct ApiDependencies {
    pub sessions: Arc<dyn SessionRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub publisher: Arc<dyn EventPublisher>,
    pub auth: AuthState,
    pub media_settings: MediaSettings,
    /// No throttling when `None`.
    pub rate_limiter: Option<RateLimiterState>,
}

impl ApiState {
    pub fn new(deps: ApiDependencies) -> Self {
        let ApiDependencies {
            sessions,
            locations,
            photos,
            storage,
            publisher,
            auth,
            media_settings,
            rate_limiter,
        } = deps;

        let session_handlers = SessionHandlers::new(
            Arc::new(CreateSessionHandler::new(sessions.clone(), publisher.clone())),
            Arc::new(UpdateSessionHandler::new(sessions.clone(), publisher.clone())),
            Arc::new(DeleteSessionHandler::new(sessions.clone(), publisher.clone())),
            Arc::new(GetSessionHandler::new(sessions.clone())),
            Arc::new(ListSessionsHandler::new(sessions)),
        );

        let location_handlers = LocationHandlers::new(
            Arc::new(CreateUserLocationHandler::new(locations.clone())),
            Arc::new(UpdateUserLocationHandler::new(locations.clone())),
            Arc::new(DeleteUserLocationHandler::new(locations.clone())),
            Arc::new(GetLocationHandler::new(locations.clone())),
            Arc::new(FindNearestSessionsHandler::new(locations)),
        );

        let media_handlers = MediaHandlers::new(
            Arc::new(UploadSessionPhotosHandler::new(
                photos.clone(),
                storage.clone(),
                publisher.clone(),
                media_settings.clone(),
            )),
            Arc::new(ListSessionPhotosHandler::new(photos.clone())),
            Arc::new(RequestPhotoDeletionHandler::new(photos.clone(), publisher)),
            Arc::new(GetUserPhotoHandler::new(photos.clone())),
            Arc::new(UploadUserPhotoHandler::new(
                photos.clone(),
                storage.clone(),
                media_settings.clone(),
            )),
            Arc::new(ReplaceUserPhotoHandler::new(
                photos.clone(),
                storage.clone(),
                media_settings,
            )),
            Arc::new(DeleteUserPhotoHandler::new(photos, storage)),
        );

        Self {
            sessions: session_handlers,
            locations: location_handlers,
            media: media_handlers,
            auth,
            throttles: rate_limiter.map_or_else(Throttles::disabled, Throttles::new),
        }
    }
}
