//! Authentication types for the domain layer.
//!
//! These types represent an authenticated caller extracted from a bearer
//! token. Any token format can populate them via the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Authenticated user extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier (`sub` claim).
    pub id: UserId,

    /// User's email address from the token claims.
    pub email: String,

    /// Platform role (e.g. `trainer`, `trainee`) if the token carries one.
    pub role: Option<String>,

    /// Whether the user's email has been confirmed.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        role: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            email_verified,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The validator could not run (misconfiguration, key unavailable).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the caller should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_require_reauthentication() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
    }

    #[test]
    fn service_unavailable_displays_reason() {
        let err = AuthError::service_unavailable("no signing key");
        assert_eq!(err.to_string(), "Auth service unavailable: no signing key");
    }
}
