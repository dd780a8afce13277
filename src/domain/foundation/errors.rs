//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,
    PhotoLimitExceeded,

    // Not found errors
    SessionNotFound,
    LocationNotFound,
    PhotoNotFound,

    // State errors
    InvalidStateTransition,

    // Conflict errors
    LocationAlreadyExists,
    PhotoAlreadyExists,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Infrastructure errors
    DatabaseError,
    StorageError,
    EventBusError,
    InternalError,
}

/// Coarse error taxonomy shared by every service.
///
/// HTTP adapters map kinds to status codes; event consumers only log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Infrastructure,
}

impl ErrorCode {
    /// Category this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat
            | ErrorCode::PhotoLimitExceeded
            | ErrorCode::InvalidStateTransition => ErrorKind::BadRequest,
            ErrorCode::SessionNotFound | ErrorCode::LocationNotFound | ErrorCode::PhotoNotFound => {
                ErrorKind::NotFound
            }
            ErrorCode::LocationAlreadyExists | ErrorCode::PhotoAlreadyExists => ErrorKind::Conflict,
            ErrorCode::Unauthorized => ErrorKind::Unauthorized,
            ErrorCode::Forbidden => ErrorKind::Forbidden,
            ErrorCode::DatabaseError
            | ErrorCode::StorageError
            | ErrorCode::EventBusError
            | ErrorCode::InternalError => ErrorKind::Infrastructure,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::PhotoLimitExceeded => "PHOTO_LIMIT_EXCEEDED",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::LocationNotFound => "LOCATION_NOT_FOUND",
            ErrorCode::PhotoNotFound => "PHOTO_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::LocationAlreadyExists => "LOCATION_ALREADY_EXISTS",
            ErrorCode::PhotoAlreadyExists => "PHOTO_ALREADY_EXISTS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::EventBusError => "EVENT_BUS_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("title");
        assert_eq!(format!("{}", err), "Field 'title' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("latitude", -90.0, 90.0, 91.5);
        assert_eq!(
            format!("{}", err),
            "Field 'latitude' must be between -90 and 90, got 91.5"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SessionNotFound, "Session not found");
        assert_eq!(format!("{}", err), "[SESSION_NOT_FOUND] Session not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "price")
            .with_detail("reason", "negative");

        assert_eq!(err.details.get("field"), Some(&"price".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"negative".to_string()));
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("address").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"address".to_string()));
    }

    #[test]
    fn error_codes_map_to_taxonomy() {
        assert_eq!(ErrorCode::PhotoLimitExceeded.kind(), ErrorKind::BadRequest);
        assert_eq!(ErrorCode::LocationNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::LocationAlreadyExists.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::Forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(ErrorCode::EventBusError.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::PhotoNotFound), "PHOTO_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}
