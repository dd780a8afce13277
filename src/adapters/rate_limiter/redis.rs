//! Redis-backed rate limiter for multi-instance deployments.
//!
//! Fixed window per key: `INCR`, set `EXPIRE` on the first hit, deny once
//! the count passes the limit. Requests may briefly exceed the limit at
//! window boundaries.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimitConfig;

#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(conn: MultiplexedConnection, config: RateLimitConfig) -> Self {
        Self { conn, config }
    }

    /// # Errors
    ///
    /// - `Unavailable` if the URL is invalid or Redis is unreachable
    pub async fn connect(url: &str, config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self::new(conn, config))
    }
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::Unavailable(e.to_string())
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let redis_key = key.to_redis_key();
        let rule = self.config.rule_for(key.tier);
        let mut conn = self.conn.clone();

        let count: i64 = conn.incr(&redis_key, 1_i64).await.map_err(unavailable)?;
        if count == 1 {
            conn.expire::<_, ()>(&redis_key, i64::from(rule.window_secs))
                .await
                .map_err(unavailable)?;
        }

        let ttl: i64 = conn.ttl(&redis_key).await.map_err(unavailable)?;
        let left_secs = if ttl > 0 { ttl as u32 } else { rule.window_secs };
        let count = u32::try_from(count).unwrap_or(u32::MAX);

        if count > rule.limit {
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit: rule.limit,
                retry_after_secs: left_secs.max(1),
                tier: key.tier,
            }));
        }

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit: rule.limit,
            remaining: rule.limit.saturating_sub(count),
            reset_after_secs: left_secs.max(1),
        }))
    }
}
