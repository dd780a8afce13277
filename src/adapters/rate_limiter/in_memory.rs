//! In-memory rate limiter for tests and single-instance deployments.
//!
//! Fixed-window counters in a HashMap. Counters are not shared between
//! processes; use `RedisRateLimiter` when running more than one instance.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimitConfig;

#[derive(Debug)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<RateLimitKey, WindowState>>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    started: Instant,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn check_at(&self, key: RateLimitKey, now: Instant) -> RateLimitResult {
        let rule = self.config.rule_for(key.tier);
        let window = Duration::from_secs(u64::from(rule.window_secs));

        let mut windows = self.windows.write().await;
        let state = windows.entry(key.clone()).or_insert(WindowState {
            count: 0,
            started: now,
        });

        if now.saturating_duration_since(state.started) >= window {
            state.count = 0;
            state.started = now;
        }

        let left = window.saturating_sub(now.saturating_duration_since(state.started));
        let left_secs = (left.as_secs() as u32).max(1);

        if state.count >= rule.limit {
            return RateLimitResult::Denied(RateLimitDenied {
                limit: rule.limit,
                retry_after_secs: left_secs,
                tier: key.tier,
            });
        }

        state.count += 1;
        RateLimitResult::Allowed(RateLimitStatus {
            limit: rule.limit,
            remaining: rule.limit.saturating_sub(state.count),
            reset_after_secs: left_secs,
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, Instant::now()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::ThrottleRule;
    use crate::ports::ThrottleTier;

    fn limiter(upload: ThrottleRule) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            upload,
            ..Default::default()
        })
    }

    fn upload_key(client: &str) -> RateLimitKey {
        RateLimitKey::new(ThrottleTier::Upload, client)
    }

    #[tokio::test]
    async fn allows_up_to_the_limit_then_denies() {
        let limiter = limiter(ThrottleRule::new(2, 60));

        let first = limiter.check(upload_key("1.1.1.1")).await.unwrap();
        assert_eq!(
            first,
            RateLimitResult::Allowed(RateLimitStatus {
                limit: 2,
                remaining: 1,
                reset_after_secs: 60,
            })
        );
        assert!(limiter.check(upload_key("1.1.1.1")).await.unwrap().is_allowed());

        match limiter.check(upload_key("1.1.1.1")).await.unwrap() {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.limit, 2);
                assert_eq!(denied.tier, ThrottleTier::Upload);
                assert!(denied.retry_after_secs >= 1 && denied.retry_after_secs <= 60);
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn clients_and_tiers_count_separately() {
        let limiter = limiter(ThrottleRule::new(1, 60));

        assert!(limiter.check(upload_key("1.1.1.1")).await.unwrap().is_allowed());
        assert!(!limiter.check(upload_key("1.1.1.1")).await.unwrap().is_allowed());

        assert!(limiter.check(upload_key("2.2.2.2")).await.unwrap().is_allowed());
        assert!(limiter
            .check(RateLimitKey::new(ThrottleTier::Long, "1.1.1.1"))
            .await
            .unwrap()
            .is_allowed());
    }

    #[tokio::test]
    async fn window_expiry_restores_the_quota() {
        let limiter = limiter(ThrottleRule::new(1, 60));
        let start = Instant::now();

        assert!(limiter.check_at(upload_key("1.1.1.1"), start).await.is_allowed());
        assert!(!limiter
            .check_at(upload_key("1.1.1.1"), start + Duration::from_secs(59))
            .await
            .is_allowed());
        assert!(limiter
            .check_at(upload_key("1.1.1.1"), start + Duration::from_secs(60))
            .await
            .is_allowed());
    }
}
