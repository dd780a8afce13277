//! Rate limiting port for the public HTTP surface.
//!
//! Requests are counted per client address in fixed windows. Each route
//! belongs to one `ThrottleTier`; the tier picks the limit and window and
//! keeps its own counter, so a burst of reads does not eat the upload budget.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port for rate limiting operations.
///
/// Implementations must be safe to share between request tasks.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `key`.
    ///
    /// Returns `Allowed` with the remaining quota or `Denied` with retry info.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Route classes with their own limits.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleTier {
    /// Authenticated writes on sessions and locations.
    Medium,
    /// Public reads.
    Long,
    /// Photo uploads.
    Upload,
    /// Photo deletions.
    Delete,
}

impl ThrottleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleTier::Medium => "medium",
            ThrottleTier::Long => "long",
            ThrottleTier::Upload => "upload",
            ThrottleTier::Delete => "delete",
        }
    }
}

impl fmt::Display for ThrottleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One counter: a tier and the client it tracks.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub tier: ThrottleTier,
    /// Client address as seen through proxies.
    pub client: String,
}

impl RateLimitKey {
    pub fn new(tier: ThrottleTier, client: impl Into<String>) -> Self {
        Self {
            tier,
            client: client.into(),
        }
    }

    /// Key of the counter in a shared store.
    pub fn to_redis_key(&self) -> String {
        format!("ratelimit:{}:{}", self.tier, self.client)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed(RateLimitStatus),
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Quota left after an allowed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window closes.
    pub reset_after_secs: u32,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub limit: u32,
    pub retry_after_secs: u32,
    pub tier: ThrottleTier,
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
