//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// HS256 access-token settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared signing secret
    pub jwt_secret: SecretString,

    /// Expected `iss` claim; not checked when unset
    pub issuer: Option<String>,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// Production additionally requires a secret of at least 32 bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
            issuer: None,
        }
    }

    #[test]
    fn test_validation_missing_secret() {
        assert_eq!(
            config("").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_short_secret_allowed_in_development() {
        assert!(config("dev").validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_production_requires_long_secret() {
        assert_eq!(
            config("short").validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        );
        assert!(config(&"x".repeat(32))
            .validate(&Environment::Production)
            .is_ok());
    }
}
