//! Event bus topics shared by every service.
//!
//! Payload contracts for each topic live next to the owning domain
//! (`session::events`, `location::events`, `media::events`, `user::events`).

pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_UPDATED: &str = "session.updated";
pub const SESSION_DELETED: &str = "session.deleted";

pub const LOCATION_CREATED_SUCCESS: &str = "location.created.success";
pub const LOCATION_CREATION_FAILED: &str = "location.creation.failed";
pub const LOCATION_UPDATE_SUCCESS: &str = "location.update.success";
pub const LOCATION_UPDATE_FAILED: &str = "location.update.failed";

pub const USER_DELETED: &str = "user.deleted";
pub const USER_EMAIL_UPDATED: &str = "user.email.updated";
pub const USER_REGISTERED: &str = "user.registered";

pub const IMAGES_SESSION_CREATED: &str = "images.session.created";
pub const IMAGES_SESSION_DELETED: &str = "images.session.deleted";

pub const SESSION_IMAGES_CREATION_APPROVED: &str = "session.images.creation.approved";
pub const SESSION_IMAGES_CREATION_REJECTED: &str = "session.images.creation.rejected";
pub const SESSION_IMAGES_DELETION_APPROVED: &str = "session.images.deletion.approved";
pub const SESSION_IMAGES_DELETION_REJECTED: &str = "session.images.deletion.rejected";
