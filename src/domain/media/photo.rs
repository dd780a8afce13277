//! Photo records and the per-session photo budget.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, OwnerRef, PhotoId, Timestamp, ValidationError,
};

/// A session never holds more than this many pending plus approved photos.
pub const MAX_SESSION_PHOTOS: usize = 3;

/// Content types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Moderation status of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoStatus {
    Pending,
    Approved,
}

impl PhotoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoStatus::Pending => "pending",
            PhotoStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for PhotoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoStatus::Pending => write!(f, "PENDING"),
            PhotoStatus::Approved => write!(f, "APPROVED"),
        }
    }
}

impl FromStr for PhotoStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(PhotoStatus::Pending),
            "approved" => Ok(PhotoStatus::Approved),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown photo status '{}'", other),
            )),
        }
    }
}

/// An uploaded file before it reaches object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// # Errors
    ///
    /// - `ValidationFailed` for empty files, files over `max_bytes`, or
    ///   content types outside `ALLOWED_MIME_TYPES`
    pub fn validate(&self, max_bytes: usize) -> Result<(), DomainError> {
        if self.bytes.is_empty() {
            return Err(DomainError::validation(
                "files",
                format!("File '{}' is empty", self.filename),
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(DomainError::validation(
                "files",
                format!(
                    "File '{}' is {} bytes, the limit is {}",
                    self.filename,
                    self.bytes.len(),
                    max_bytes
                ),
            ));
        }
        if !ALLOWED_MIME_TYPES.contains(&self.content_type.as_str()) {
            return Err(DomainError::validation(
                "files",
                format!(
                    "File '{}' has unsupported type '{}'",
                    self.filename, self.content_type
                ),
            ));
        }
        Ok(())
    }
}

/// Checks that `requested` more photos fit next to `existing` ones.
///
/// # Errors
///
/// - `ValidationFailed` when no file was sent
/// - `PhotoLimitExceeded` when the total would pass `MAX_SESSION_PHOTOS`
pub fn ensure_session_capacity(existing: usize, requested: usize) -> Result<(), DomainError> {
    if requested == 0 {
        return Err(DomainError::validation("files", "At least one file is required"));
    }
    if existing + requested > MAX_SESSION_PHOTOS {
        return Err(DomainError::new(
            ErrorCode::PhotoLimitExceeded,
            format!(
                "A session can hold at most {} photos; {} stored or pending, {} requested",
                MAX_SESSION_PHOTOS, existing, requested
            ),
        )
        .with_detail("existing", existing.to_string())
        .with_detail("requested", requested.to_string()));
    }
    Ok(())
}

/// Row to insert once the blob is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub owner: OwnerRef,
    pub url: String,
    pub storage_key: String,
    pub filename: String,
    pub mimetype: String,
    pub status: PhotoStatus,
}

/// A stored photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    pub owner: OwnerRef,
    pub url: String,
    pub storage_key: String,
    pub filename: String,
    pub mimetype: String,
    pub status: PhotoStatus,
    pub created_at: Timestamp,
}

impl Photo {
    pub fn from_new(id: PhotoId, new: NewPhoto, created_at: Timestamp) -> Self {
        Self {
            id,
            owner: new.owner,
            url: new.url,
            storage_key: new.storage_key,
            filename: new.filename,
            mimetype: new.mimetype,
            status: new.status,
            created_at,
        }
    }
}
