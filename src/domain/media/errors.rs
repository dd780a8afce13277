//! Media-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Photo (or user photo) not found.
    NotFound(String),
    /// The user already has a profile photo.
    AlreadyExists,
    /// Batch would take a session past its photo budget.
    LimitExceeded { existing: usize, requested: usize },
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Store, object storage or bus failure.
    Infrastructure(String),
}

impl MediaError {
    pub fn not_found(message: impl Into<String>) -> Self {
        MediaError::NotFound(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MediaError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        MediaError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            MediaError::NotFound(_) => ErrorCode::PhotoNotFound,
            MediaError::AlreadyExists => ErrorCode::PhotoAlreadyExists,
            MediaError::LimitExceeded { .. } => ErrorCode::PhotoLimitExceeded,
            MediaError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MediaError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            MediaError::NotFound(msg) => msg.clone(),
            MediaError::AlreadyExists => {
                "A photo already exists for this user, use the update endpoint".to_string()
            }
            MediaError::LimitExceeded {
                existing,
                requested,
            } => format!(
                "Photo limit exceeded: {} already attached, {} requested",
                existing, requested
            ),
            MediaError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MediaError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MediaError {}

impl From<DomainError> for MediaError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PhotoLimitExceeded => MediaError::LimitExceeded {
                existing: detail_count(&err, "existing"),
                requested: detail_count(&err, "requested"),
            },
            ErrorCode::PhotoNotFound => MediaError::NotFound(err.message),
            ErrorCode::PhotoAlreadyExists => MediaError::AlreadyExists,
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => MediaError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => MediaError::Infrastructure(err.to_string()),
        }
    }
}

fn detail_count(err: &DomainError, key: &str) -> usize {
    err.details
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::ensure_session_capacity;

    #[test]
    fn limit_error_keeps_counts() {
        let err: MediaError = ensure_session_capacity(2, 2).unwrap_err().into();
        assert_eq!(
            err,
            MediaError::LimitExceeded {
                existing: 2,
                requested: 2
            }
        );
        assert_eq!(err.code(), ErrorCode::PhotoLimitExceeded);
    }

    #[test]
    fn storage_error_is_infrastructure() {
        let err: MediaError = DomainError::new(ErrorCode::StorageError, "disk full").into();
        assert!(matches!(err, MediaError::Infrastructure(_)));
    }
}
