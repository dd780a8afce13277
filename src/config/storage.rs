//! Photo storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

const MAX_ALLOWED_FILE_BYTES: usize = 50 * 1024 * 1024;

/// Where photo blobs live and how they are addressed
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding stored files
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// URL prefix under which `root_dir` is served
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_user_photo_folder")]
    pub user_photo_folder: String,

    #[serde(default = "default_session_photo_folder")]
    pub session_photo_folder: String,

    /// Per-file upload limit in bytes
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for folder in [&self.user_photo_folder, &self.session_photo_folder] {
            let bad = folder.is_empty()
                || folder.contains("..")
                || folder.starts_with('/')
                || folder.contains('\\');
            if bad {
                return Err(ValidationError::InvalidStorageFolder(folder.clone()));
            }
        }
        if self.max_file_bytes == 0 || self.max_file_bytes > MAX_ALLOWED_FILE_BYTES {
            return Err(ValidationError::InvalidMaxFileSize);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            public_base_url: default_public_base_url(),
            user_photo_folder: default_user_photo_folder(),
            session_photo_folder: default_session_photo_folder(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/files".to_string()
}

fn default_user_photo_folder() -> String {
    "users".to_string()
}

fn default_session_photo_folder() -> String {
    "sessions".to_string()
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024
}
