//! Error bodies and status mapping shared by every router.
//!
//! Domain errors map to HTTP status through `ErrorKind`. Infrastructure
//! failures are logged here and answered with a generic 500 body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::{ErrorCode, ErrorKind};
use crate::domain::location::LocationError;
use crate::domain::media::MediaError;
use crate::domain::session::SessionError;

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHENTICATED", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// An error ready to be written as a response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorResponse::bad_request(message))
    }

    /// Maps a coded domain failure. Infrastructure messages stay in the log.
    fn from_code(code: ErrorCode, message: String) -> Self {
        let status = status_for(code.kind());
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = %code, error = %message, "request failed");
            return Self::new(status, ErrorResponse::internal("Internal server error"));
        }
        Self::new(status, ErrorResponse::new(code.to_string(), message))
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::from_code(err.code(), err.message())
    }
}

impl From<LocationError> for ApiError {
    fn from(err: LocationError) -> Self {
        Self::from_code(err.code(), err.message())
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        let details = match &err {
            MediaError::LimitExceeded {
                existing,
                requested,
            } => Some(serde_json::json!({ "existing": existing, "requested": requested })),
            _ => None,
        };
        let mut api = Self::from_code(err.code(), err.message());
        api.body.details = details;
        api
    }
}
