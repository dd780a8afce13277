//! Rate limiter adapters.
//!
//! - `InMemoryRateLimiter` - single process, also used in tests
//! - `RedisRateLimiter` - counters shared by every instance

mod config;
mod in_memory;
mod redis;

pub use config::{RateLimitConfig, ThrottleRule};
pub use in_memory::InMemoryRateLimiter;
pub use self::redis::RedisRateLimiter;
