//! Mock session validator for tests.
//!
//! ```ignore
//! let validator = MockSessionValidator::new()
//!     .with_user("trainer-token", AuthenticatedUser::new(trainer_id, "t@example.com", None, true));
//!
//! let user = validator.validate("trainer-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to users. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a token for a user with a generated email.
    pub fn with_test_user(self, token: impl Into<String>, user_id: UserId) -> Self {
        let user = AuthenticatedUser::new(
            user_id,
            format!("{}@test.example.com", user_id),
            None,
            true,
        );
        self.with_user(token, user)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        if let Ok(mut forced) = self.force_error.write() {
            *forced = Some(error);
        }
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), user);
        }
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(token);
        }
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let forced = self
            .force_error
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator lock poisoned"))?
            .clone();
        if let Some(error) = forced {
            return Err(error);
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator lock poisoned"))?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
