//! HTTP handlers for media endpoints.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::media::{
    DeleteUserPhotoHandler, GetUserPhotoHandler, ListSessionPhotosHandler,
    ReplaceUserPhotoHandler, RequestPhotoDeletionCommand, RequestPhotoDeletionHandler,
    UploadSessionPhotosCommand, UploadSessionPhotosHandler, UploadUserPhotoHandler,
};
use crate::domain::foundation::{CommandMetadata, SessionId, UserId};
use crate::domain::media::{PhotoFile, MAX_SESSION_PHOTOS};

use super::dto::{DeletionRequestedResponse, PhotoIdsParams, PhotoResponse, UploadBatchResponse};

/// Multipart field carrying session photos.
pub const SESSION_FILES_FIELD: &str = "files";
/// Multipart field carrying a profile photo.
pub const USER_FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct MediaHandlers {
    upload_session_handler: Arc<UploadSessionPhotosHandler>,
    list_session_handler: Arc<ListSessionPhotosHandler>,
    request_deletion_handler: Arc<RequestPhotoDeletionHandler>,
    get_user_handler: Arc<GetUserPhotoHandler>,
    upload_user_handler: Arc<UploadUserPhotoHandler>,
    replace_user_handler: Arc<ReplaceUserPhotoHandler>,
    delete_user_handler: Arc<DeleteUserPhotoHandler>,
}

impl MediaHandlers {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        upload_session_handler: Arc<UploadSessionPhotosHandler>,
        list_session_handler: Arc<ListSessionPhotosHandler>,
        request_deletion_handler: Arc<RequestPhotoDeletionHandler>,
        get_user_handler: Arc<GetUserPhotoHandler>,
        upload_user_handler: Arc<UploadUserPhotoHandler>,
        replace_user_handler: Arc<ReplaceUserPhotoHandler>,
        delete_user_handler: Arc<DeleteUserPhotoHandler>,
    ) -> Self {
        Self {
            upload_session_handler,
            list_session_handler,
            request_deletion_handler,
            get_user_handler,
            upload_user_handler,
            replace_user_handler,
            delete_user_handler,
        }
    }
}

/// Collects every part named `field` as a `PhotoFile`. Other parts are skipped.
async fn read_files(
    multipart: Result<Multipart, MultipartRejection>,
    field: &str,
) -> Result<Vec<PhotoFile>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut files = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let filename = part.file_name().unwrap_or("upload").to_string();
        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        files.push(PhotoFile::new(filename, content_type, bytes.to_vec()));
    }

    Ok(files)
}

async fn read_single_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PhotoFile, ApiError> {
    let mut files = read_files(multipart, USER_FILE_FIELD).await?;
    match files.len() {
        1 => Ok(files.remove(0)),
        0 => Err(ApiError::bad_request(format!(
            "Expected a file in field '{}'",
            USER_FILE_FIELD
        ))),
        _ => Err(ApiError::bad_request("Only one profile photo can be uploaded")),
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse::<SessionId>()
        .map_err(|_| ApiError::bad_request("Invalid session ID"))
}

// ════════════════════════════════════════════════════════════════════════════
// Session photos
// ════════════════════════════════════════════════════════════════════════════

/// POST /media/sessions/:session_id - Upload up to three photos for moderation
pub async fn upload_session_photos(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let files = match read_files(multipart, SESSION_FILES_FIELD).await {
        Ok(files) => files,
        Err(e) => return e.into_response(),
    };
    if files.len() > MAX_SESSION_PHOTOS {
        return ApiError::bad_request(format!(
            "At most {} files can be uploaded at once",
            MAX_SESSION_PHOTOS
        ))
        .into_response();
    }

    let cmd = UploadSessionPhotosCommand { session_id, files };
    match handlers
        .upload_session_handler
        .handle(cmd, CommandMetadata::new(user.id))
        .await
    {
        Ok(batch) => {
            (StatusCode::CREATED, Json(UploadBatchResponse::from(batch))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /media/sessions/:session_id - Approved photos of a session
pub async fn list_session_photos(
    State(handlers): State<MediaHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.list_session_handler.handle(session_id).await {
        Ok(photos) => {
            let body: Vec<PhotoResponse> = photos.iter().map(PhotoResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE /media/sessions/:session_id/photos?photoIds=1,2 - Ask moderation to remove photos
pub async fn request_photo_deletion(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    Query(params): Query<PhotoIdsParams>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let photo_ids = match params.parse() {
        Ok(ids) => ids,
        Err(message) => return ApiError::bad_request(message).into_response(),
    };

    let cmd = RequestPhotoDeletionCommand {
        session_id,
        photo_ids,
    };
    match handlers
        .request_deletion_handler
        .handle(cmd, CommandMetadata::new(user.id))
        .await
    {
        Ok(ids) => {
            let body = DeletionRequestedResponse {
                session_id: session_id.to_string(),
                photo_ids: ids.iter().map(|id| id.value()).collect(),
            };
            (StatusCode::ACCEPTED, Json(body)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Profile photos
// ════════════════════════════════════════════════════════════════════════════

/// GET /media/user - The caller's profile photo
pub async fn get_own_photo(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match handlers.get_user_handler.handle(user.id).await {
        Ok(photo) => (StatusCode::OK, Json(PhotoResponse::from(&photo))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /media/user/:user_id - Another user's profile photo
pub async fn get_user_photo(
    State(handlers): State<MediaHandlers>,
    Path(user_id): Path<String>,
) -> Response {
    let Ok(user_id) = user_id.parse::<UserId>() else {
        return ApiError::bad_request("Invalid user ID").into_response();
    };

    match handlers.get_user_handler.handle(user_id).await {
        Ok(photo) => (StatusCode::OK, Json(PhotoResponse::from(&photo))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /media/user - Upload the caller's profile photo
pub async fn upload_user_photo(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let file = match read_single_file(multipart).await {
        Ok(file) => file,
        Err(e) => return e.into_response(),
    };

    match handlers.upload_user_handler.handle(user.id, file).await {
        Ok(photo) => (StatusCode::CREATED, Json(PhotoResponse::from(&photo))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /media/user - Replace the caller's profile photo
pub async fn replace_user_photo(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let file = match read_single_file(multipart).await {
        Ok(file) => file,
        Err(e) => return e.into_response(),
    };

    match handlers.replace_user_handler.handle(user.id, file).await {
        Ok(photo) => (StatusCode::OK, Json(PhotoResponse::from(&photo))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE /media/user - Remove the caller's profile photo
pub async fn delete_user_photo(
    State(handlers): State<MediaHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match handlers.delete_user_handler.handle(user.id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
