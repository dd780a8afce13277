//! Per-tier limits.

use serde::{Deserialize, Serialize};

use crate::ports::ThrottleTier;

/// Requests allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleRule {
    pub limit: u32,
    pub window_secs: u32,
}

impl ThrottleRule {
    pub const fn new(limit: u32, window_secs: u32) -> Self {
        Self { limit, window_secs }
    }
}

/// Limits for every tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub medium: ThrottleRule,
    pub long: ThrottleRule,
    pub upload: ThrottleRule,
    pub delete: ThrottleRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            medium: ThrottleRule::new(20, 60),
            long: ThrottleRule::new(100, 60),
            upload: ThrottleRule::new(10, 60),
            delete: ThrottleRule::new(10, 60),
        }
    }
}

impl RateLimitConfig {
    pub fn rule_for(&self, tier: ThrottleTier) -> ThrottleRule {
        match tier {
            ThrottleTier::Medium => self.medium,
            ThrottleTier::Long => self.long,
            ThrottleTier::Upload => self.upload,
            ThrottleTier::Delete => self.delete,
        }
    }
}
