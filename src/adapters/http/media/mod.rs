//! HTTP adapter for media endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{DeletionRequestedResponse, PhotoIdsParams, PhotoResponse, UploadBatchResponse};
pub use handlers::{MediaHandlers, SESSION_FILES_FIELD, USER_FILE_FIELD};
pub use routes::media_routes;
