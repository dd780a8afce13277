//! Media domain module.
//!
//! User profile photos and session photos. Session photos enter as
//! `Pending`, wait for an external moderation decision, and never number
//! more than `MAX_SESSION_PHOTOS` per session.

mod errors;
mod events;
mod photo;

pub use errors::MediaError;
pub use events::{
    ImagesSessionCreated, ImagesSessionDeleted, SessionImagesCreationApproved,
    SessionImagesCreationRejected, SessionImagesDeletionApproved, SessionImagesDeletionRejected,
};
pub use photo::{
    ensure_session_capacity, NewPhoto, Photo, PhotoFile, PhotoStatus, ALLOWED_MIME_TYPES,
    MAX_SESSION_PHOTOS,
};
