//! Session validation port for bearer token validation.
//!
//! Provider-agnostic: the HS256 JWT validator and the test mock both
//! implement it.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate expiry (and issuer when configured)
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct TestSessionValidator {
        tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            self.tokens
                .read()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn session_validator_resolves_known_tokens_only() {
        let user = AuthenticatedUser::new(UserId::new(), "coach@example.com", None, true);
        let validator = TestSessionValidator {
            tokens: RwLock::new(HashMap::from([("tok".to_string(), user.clone())])),
        };

        assert_eq!(validator.validate("tok").await.unwrap(), user);
        assert_eq!(
            validator.validate("other").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn session_validator_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
    }
}
