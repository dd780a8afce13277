//! Bearer authentication for the HTTP surface.
//!
//! `auth_middleware` resolves the `Authorization` header through the
//! `SessionValidator` port and stores the caller in the request extensions.
//! Handlers that mutate state take `RequireAuth`, which turns a missing
//! caller into 401.
//!
//! ```text
//! Request → auth_middleware ──(AuthenticatedUser in extensions)──→ RequireAuth
//! ```
//!
//! Reads such as `GET /sessions/:id` or `GET /sessions/nearest` do not take
//! `RequireAuth` and stay public.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Validator shared by every router.
pub type AuthState = Arc<dyn SessionValidator>;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn auth_failure(error: &AuthError) -> Response {
    let (status, message) = match error {
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
        AuthError::ServiceUnavailable(reason) => {
            tracing::error!(error = %reason, "token validation unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable",
            )
        }
    };
    (status, Json(ErrorResponse::new("AUTH_ERROR", message))).into_response()
}

/// Resolves the caller of a request.
///
/// No header: the request passes through anonymous. A token that does not
/// validate: 401 (503 if the validator is down), the handler never runs.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_failure(&e),
    }
}

/// The authenticated caller. Rejects with 401 when the request is anonymous.
///
/// ```ignore
/// async fn delete_session(RequireAuth(user): RequireAuth, ...) -> Response
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized("Authentication required")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::UserId;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    fn trainer() -> AuthenticatedUser {
        AuthenticatedUser::new(
            UserId::new(),
            "coach@example.com",
            Some("trainer".to_string()),
            true,
        )
    }

    async fn whoami(RequireAuth(user): RequireAuth) -> String {
        user.email
    }

    async fn public() -> &'static str {
        "open"
    }

    async fn call(
        validator: AuthState,
        uri: &str,
        authorization: Option<&str>,
    ) -> (StatusCode, String) {
        let app = axum::Router::new()
            .route("/whoami", get(whoami))
            .route("/public", get(public))
            .layer(axum::middleware::from_fn_with_state(validator, auth_middleware));

        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer   ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer tok-1".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("tok-1"));
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler() {
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_user("valid-token", trainer()));
        let (status, body) = call(validator, "/whoami", Some("Bearer valid-token")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "coach@example.com");
    }

    #[tokio::test]
    async fn anonymous_request_is_public_only() {
        let validator: AuthState = Arc::new(MockSessionValidator::new());

        let (status, body) = call(validator.clone(), "/public", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "open");

        let (status, body) = call(validator, "/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn bad_or_expired_token_is_401_even_on_public_routes() {
        let validator: AuthState = Arc::new(MockSessionValidator::new());
        let (status, _) = call(validator, "/public", Some("Bearer nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_error(AuthError::TokenExpired));
        let (status, body) = call(validator, "/whoami", Some("Bearer anything")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Token expired"));
    }

    #[tokio::test]
    async fn validator_outage_is_503() {
        let validator: AuthState = Arc::new(
            MockSessionValidator::new().with_error(AuthError::service_unavailable("no key")),
        );
        let (status, _) = call(validator, "/whoami", Some("Bearer anything")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
