//! Media service: session photos behind moderation, user profile photos
//! and the cascades that clean both up.

mod blob_cleanup;
mod media_cascade;
mod moderation;
mod session_photos;
mod settings;
mod upload_session_photos;
mod user_photo;

pub use media_cascade::MediaCascadeHandler;
pub use moderation::ModerationHandler;
pub use session_photos::{
    ListSessionPhotosHandler, RequestPhotoDeletionCommand, RequestPhotoDeletionHandler,
};
pub use settings::{MediaSettings, DEFAULT_MAX_FILE_BYTES};
pub use upload_session_photos::{
    UploadSessionPhotosCommand, UploadSessionPhotosHandler, UploadedBatch,
};
pub use user_photo::{
    DeleteUserPhotoHandler, GetUserPhotoHandler, ReplaceUserPhotoHandler, UploadUserPhotoHandler,
};
