//! Redis Streams event bus configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Prefix of every stream key (`{prefix}:{topic}`)
    #[serde(default = "default_stream_prefix")]
    pub stream_prefix: String,

    /// Consumer group shared by all instances
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,

    /// Name of this instance inside the group; `$HOSTNAME` when unset.
    /// Keep it stable across restarts so unacknowledged entries are replayed.
    pub consumer_name: Option<String>,

    /// Idle time after which another instance's pending entries are claimed
    #[serde(default = "default_claim_idle_ms")]
    pub claim_idle_ms: u64,

    /// How long one read blocks, in milliseconds
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,

    /// Entries read per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl RedisConfig {
    pub fn block(&self) -> Duration {
        Duration::from_millis(self.block_ms)
    }

    pub fn claim_idle(&self) -> Duration {
        Duration::from_millis(self.claim_idle_ms)
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.consumer_group.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__CONSUMER_GROUP"));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            stream_prefix: default_stream_prefix(),
            consumer_group: default_consumer_group(),
            consumer_name: None,
            claim_idle_ms: default_claim_idle_ms(),
            block_ms: default_block_ms(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_stream_prefix() -> String {
    "yoga:events".to_string()
}

fn default_consumer_group() -> String {
    "yoga-sessions".to_string()
}

fn default_block_ms() -> u64 {
    5000
}

fn default_claim_idle_ms() -> u64 {
    60_000
}

fn default_batch_size() -> usize {
    50
}
