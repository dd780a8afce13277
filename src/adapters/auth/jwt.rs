//! HS256 JWT adapter for bearer token validation.
//!
//! Tokens are issued by the user service and signed with a shared secret.
//! This adapter checks:
//!
//! - **Signature**: HS256 with the configured secret
//! - **Expiry (exp)**: must be in the future
//! - **Issuer (iss)**: must match when an issuer is configured
//!
//! and maps `sub` (a UUID), `email` and `role` onto `AuthenticatedUser`.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Validates HS256-signed access tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString, issuer: Option<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            issuer: issuer.filter(|i| !i.is_empty()),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        match &self.issuer {
            Some(issuer) => {
                validation.set_issuer(&[issuer]);
                validation.set_required_spec_claims(&["exp", "iss", "sub"]);
            }
            None => validation.set_required_spec_claims(&["exp", "sub"]),
        }
        validation
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?
            .claims;

        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::warn!("Invalid user ID in token: {}", claims.sub);
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            claims.email.unwrap_or_default(),
            claims.role,
            claims.email_verified.unwrap_or(false),
        ))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-with-enough-entropy";

    fn secret() -> SecretString {
        SecretString::new(SECRET.to_string())
    }

    fn claims(sub: &str, exp_offset_secs: i64, iss: Option<&str>) -> AccessClaims {
        AccessClaims {
            sub: sub.to_string(),
            email: Some("trainer@example.com".to_string()),
            role: Some("trainer".to_string()),
            email_verified: Some(true),
            exp: (chrono::Utc::now().timestamp() + exp_offset_secs) as u64,
            iss: iss.map(str::to_string),
        }
    }

    fn sign(claims: &AccessClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_maps_to_user() {
        let id = UserId::new();
        let validator = JwtSessionValidator::new(&secret(), None);

        let user = validator
            .validate(&sign(&claims(&id.to_string(), 600, None), SECRET))
            .await
            .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email, "trainer@example.com");
        assert_eq!(user.role.as_deref(), Some("trainer"));
        assert!(user.email_verified);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let validator = JwtSessionValidator::new(&secret(), None);
        let token = sign(&claims(&UserId::new().to_string(), -600, None), SECRET);

        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn wrong_signature_is_invalid() {
        let validator = JwtSessionValidator::new(&secret(), None);
        let token = sign(&claims(&UserId::new().to_string(), 600, None), "other-secret");

        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn non_uuid_subject_is_invalid() {
        let validator = JwtSessionValidator::new(&secret(), None);
        let token = sign(&claims("not-a-uuid", 600, None), SECRET);

        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let validator =
            JwtSessionValidator::new(&secret(), Some("https://users.example.com".to_string()));
        let sub = UserId::new().to_string();

        let good = sign(&claims(&sub, 600, Some("https://users.example.com")), SECRET);
        let bad = sign(&claims(&sub, 600, Some("https://evil.example.com")), SECRET);
        let missing = sign(&claims(&sub, 600, None), SECRET);

        assert!(validator.validate(&good).await.is_ok());
        assert!(validator.validate(&bad).await.is_err());
        assert!(validator.validate(&missing).await.is_err());
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let validator = JwtSessionValidator::new(&secret(), None);
        assert_eq!(
            validator.validate("not.a.jwt").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
