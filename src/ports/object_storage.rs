//! ObjectStorage port for photo blobs.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::media::PhotoFile;

/// Errors that can occur during blob storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Blob not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// IO or provider error
    IoError(String),
    /// Invalid key or folder
    InvalidKey(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Blob not found: {}", msg),
            Self::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Where a blob ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Provider reference used to delete the blob later.
    pub key: String,
    /// Public URL of the blob.
    pub url: String,
}

/// Blob store holding photo files.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `file` under `folder`.
    async fn upload(&self, folder: &str, file: &PhotoFile) -> Result<StoredObject, StorageError>;

    /// Remove a blob. Deleting a missing blob succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
