//! Per-route rate limiting for axum.
//!
//! Every route is wrapped in the tier it belongs to (`Throttles::apply`).
//! The middleware counts the request against `(tier, client address)` and
//! answers 429 once the window is used up.
//!
//! Responses carry:
//! - `X-RateLimit-Limit`: requests allowed in the window
//! - `X-RateLimit-Remaining`: requests left in the window
//! - `X-RateLimit-Reset`: seconds until the window closes
//! - `Retry-After`: seconds to wait (429 only)
//!
//! A limiter backend error lets the request through.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::ports::{RateLimitKey, RateLimitResult, RateLimiter, ThrottleTier};

/// Rate limiter shared by every router.
pub type RateLimiterState = Arc<dyn RateLimiter>;

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    pub static X_RATELIMIT_REMAINING: HeaderName =
        HeaderName::from_static("x-ratelimit-remaining");
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Client used when no proxy header and no socket address is known.
const UNKNOWN_CLIENT: &str = "unknown";

/// State of one throttled route.
#[derive(Clone)]
pub struct Throttle {
    limiter: RateLimiterState,
    tier: ThrottleTier,
}

/// Hands out per-tier layers. Disabled when built without a limiter.
#[derive(Clone, Default)]
pub struct Throttles {
    limiter: Option<RateLimiterState>,
}

impl Throttles {
    pub fn new(limiter: RateLimiterState) -> Self {
        Self {
            limiter: Some(limiter),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Wraps every method of `route` in the limiter for `tier`.
    pub fn apply<S>(&self, tier: ThrottleTier, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match &self.limiter {
            Some(limiter) => route.route_layer(middleware::from_fn_with_state(
                Throttle {
                    limiter: limiter.clone(),
                    tier,
                },
                rate_limit_middleware,
            )),
            None => route,
        }
    }
}

pub async fn rate_limit_middleware(
    State(throttle): State<Throttle>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_address(request.headers(), connect_info.as_ref())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    let key = RateLimitKey::new(throttle.tier, client);

    let status = match throttle.limiter.check(key).await {
        Ok(RateLimitResult::Allowed(status)) => Some(status),
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::info!(
                tier = %denied.tier,
                retry_after = denied.retry_after_secs,
                "request throttled"
            );
            return too_many_requests(denied.limit, denied.retry_after_secs);
        }
        Err(e) => {
            tracing::warn!(error = %e, tier = %throttle.tier, "rate limiter unavailable");
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some(status) = status {
        set_quota_headers(
            response.headers_mut(),
            status.limit,
            status.remaining,
            status.reset_after_secs,
        );
    }
    response
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address.
fn client_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = real_ip {
        return Some(ip.to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

fn too_many_requests(limit: u32, retry_after_secs: u32) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new(
            "RATE_LIMIT_EXCEEDED",
            format!("Too many requests, retry in {} seconds", retry_after_secs),
        )),
    )
        .into_response();

    let headers = response.headers_mut();
    set_quota_headers(headers, limit, 0, retry_after_secs);
    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

fn set_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after_secs: u32) {
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(remaining),
    );
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(reset_after_secs),
    );
}
