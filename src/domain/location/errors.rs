//! Location-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// No location stored for the owner.
    NotFound(OwnerRef),
    /// A location already exists for the owner.
    AlreadyExists(OwnerRef),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Store or bus failure.
    Infrastructure(String),
}

impl LocationError {
    pub fn not_found(owner: OwnerRef) -> Self {
        LocationError::NotFound(owner)
    }
    pub fn already_exists(owner: OwnerRef) -> Self {
        LocationError::AlreadyExists(owner)
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LocationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        LocationError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            LocationError::NotFound(_) => ErrorCode::LocationNotFound,
            LocationError::AlreadyExists(_) => ErrorCode::LocationAlreadyExists,
            LocationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            LocationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            LocationError::NotFound(owner) => format!("No location stored for {}", owner),
            LocationError::AlreadyExists(owner) => {
                format!("A location already exists for {}, update it instead", owner)
            }
            LocationError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            LocationError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for LocationError {}

impl From<DomainError> for LocationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => LocationError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => LocationError::Infrastructure(err.to_string()),
        }
    }
}
