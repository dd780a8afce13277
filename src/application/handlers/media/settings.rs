//! Storage layout and upload limits shared by the media handlers.

/// 5 MiB.
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub user_photo_folder: String,
    pub session_photo_folder: String,
    pub max_file_bytes: usize,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            user_photo_folder: "users".to_string(),
            session_photo_folder: "sessions".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}
