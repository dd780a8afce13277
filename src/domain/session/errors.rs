//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// Caller is not the trainer of the session.
    Forbidden,
    /// Invalid status transition.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Store or bus failure.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn forbidden() -> Self {
        SessionError::Forbidden
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::Forbidden => ErrorCode::Forbidden,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::Forbidden => "Permission denied".to_string(),
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => SessionError::Forbidden,
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
