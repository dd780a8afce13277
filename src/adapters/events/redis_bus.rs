//! Redis Streams event bus for multi-process deployments.
//!
//! Each topic maps to one stream (`{stream_prefix}:{topic}`). Publishing is an
//! `XADD` of the serialized envelope. Consumption runs in one background
//! loop per process using a consumer group, so every service instance in
//! the same group sees each entry once; entries are acknowledged after the
//! subscribed handlers ran.
//!
//! ## Delivery
//!
//! - At-least-once: entries read but not acknowledged before a crash are
//!   replayed from the group's pending list on the next start. The consumer
//!   name defaults to `$HOSTNAME` so a restarted instance finds its own
//!   pending entries, and entries left idle by any other consumer for
//!   longer than `claim_idle` are claimed with `XCLAIM` before the replay
//! - Handler failures are logged; the entry is still acknowledged
//! - Per-topic ordering is preserved within one consumer
//!
//! Subscriptions must be registered before [`RedisEventBus::run`] starts;
//! the loop reads only the streams known at that point.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{
    StreamClaimReply, StreamId, StreamMaxlen, StreamPendingCountReply, StreamReadOptions,
    StreamReadReply,
};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

use super::in_memory::dispatch;

/// Field holding the serialized envelope inside a stream entry.
const ENVELOPE_FIELD: &str = "envelope";

/// Configuration for the Redis Streams bus.
#[derive(Debug, Clone)]
pub struct RedisEventBusConfig {
    /// Namespace for stream keys.
    pub stream_prefix: String,
    /// Consumer group shared by all instances of this service.
    pub group: String,
    /// Name of this consumer inside the group. Must survive restarts.
    pub consumer: String,
    /// How long one `XREADGROUP` waits for new entries.
    pub block: Duration,
    /// Max entries read per call.
    pub batch_size: usize,
    /// Approximate cap on stream length.
    pub max_len: usize,
    /// Pending entries of other consumers idle this long are taken over at start.
    pub claim_idle: Duration,
}

impl Default for RedisEventBusConfig {
    fn default() -> Self {
        Self {
            stream_prefix: "yoga:events".to_string(),
            group: "yoga-sessions".to_string(),
            consumer: default_consumer_name(),
            block: Duration::from_secs(5),
            batch_size: 50,
            max_len: 100_000,
            claim_idle: Duration::from_secs(60),
        }
    }
}

/// `$HOSTNAME`, which is stable per pod or container.
fn default_consumer_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "yoga-sessions".to_string())
}

impl RedisEventBusConfig {
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    pub fn with_stream_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.stream_prefix = prefix.into();
        self
    }
}

/// Event bus backed by Redis Streams.
pub struct RedisEventBus {
    client: redis::Client,
    conn: MultiplexedConnection,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    config: RedisEventBusConfig,
}

impl RedisEventBus {
    /// Opens the publishing connection.
    ///
    /// # Errors
    ///
    /// - `EventBusError` if the URL is invalid or Redis is unreachable
    pub async fn connect(url: &str, config: RedisEventBusConfig) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(bus_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(bus_error)?;

        tracing::info!(
            group = %config.group,
            consumer = %config.consumer,
            "connected to redis event bus"
        );

        Ok(Self {
            client,
            conn,
            handlers: RwLock::new(HashMap::new()),
            config,
        })
    }

    /// Stream key for a topic.
    pub fn stream_key(&self, topic: &str) -> String {
        format!("{}:{}", self.config.stream_prefix, topic)
    }

    fn topic_of<'a>(&self, stream_key: &'a str) -> &'a str {
        stream_key
            .strip_prefix(self.config.stream_prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(stream_key)
    }

    fn subscribed_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .handlers
            .read()
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default();
        topics.sort();
        topics
    }

    fn handlers_for(&self, topic: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .ok()
            .and_then(|h| h.get(topic).cloned())
            .unwrap_or_default()
    }

    /// Consume subscribed streams until `shutdown` flips to `true`.
    ///
    /// Uses its own connection since `XREADGROUP ... BLOCK` would stall
    /// publishes sharing a multiplexed connection.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        let topics = self.subscribed_topics();
        if topics.is_empty() {
            tracing::warn!("redis event bus started without subscriptions");
            return Ok(());
        }
        let keys: Vec<String> = topics.iter().map(|t| self.stream_key(t)).collect();

        let mut reader = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(bus_error)?;
        self.ensure_groups(&mut reader, &keys).await?;

        let claimed = self.claim_stale(&mut reader, &keys).await?;
        if claimed > 0 {
            tracing::info!(claimed, "claimed stale entries from other consumers");
        }

        // Entries delivered to this consumer before a restart and never acked.
        loop {
            let replayed = self.read_batch(&mut reader, &keys, "0").await?;
            if replayed == 0 {
                break;
            }
            tracing::info!(replayed, "replayed pending stream entries");
        }

        tracing::info!(streams = keys.len(), "redis event consumer running");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("redis event consumer stopping");
                        return Ok(());
                    }
                }
                result = self.read_batch(&mut reader, &keys, ">") => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "reading event streams failed");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }

    async fn ensure_groups(
        &self,
        conn: &mut MultiplexedConnection,
        keys: &[String],
    ) -> Result<(), DomainError> {
        for key in keys {
            let created: Result<(), redis::RedisError> = conn
                .xgroup_create_mkstream(key, &self.config.group, "0")
                .await;
            match created {
                Ok(()) => tracing::debug!(stream = %key, "created consumer group"),
                Err(e) if e.code() == Some("BUSYGROUP") => {}
                Err(e) => return Err(bus_error(e)),
            }
        }
        Ok(())
    }

    /// Moves pending entries that another consumer left idle past
    /// `claim_idle` into this consumer's pending list.
    async fn claim_stale(
        &self,
        conn: &mut MultiplexedConnection,
        keys: &[String],
    ) -> Result<usize, DomainError> {
        let min_idle_ms = self.config.claim_idle.as_millis() as usize;
        let mut claimed = 0;

        for key in keys {
            let mut start = "-".to_string();
            loop {
                let pending: StreamPendingCountReply = conn
                    .xpending_count(key, &self.config.group, &start, "+", self.config.batch_size)
                    .await
                    .map_err(bus_error)?;
                let Some(last) = pending.ids.last() else {
                    break;
                };
                let next = format!("({}", last.id);

                let stale = claimable(
                    pending
                        .ids
                        .iter()
                        .map(|p| (p.id.as_str(), p.consumer.as_str(), p.last_delivered_ms)),
                    &self.config.consumer,
                    min_idle_ms,
                );
                if !stale.is_empty() {
                    let reply: StreamClaimReply = conn
                        .xclaim(
                            key,
                            &self.config.group,
                            &self.config.consumer,
                            min_idle_ms,
                            &stale[..],
                        )
                        .await
                        .map_err(bus_error)?;
                    tracing::debug!(stream = %key, count = reply.ids.len(), "claimed entries");
                    claimed += reply.ids.len();
                }

                if pending.ids.len() < self.config.batch_size {
                    break;
                }
                start = next;
            }
        }
        Ok(claimed)
    }

    /// Reads and dispatches one batch. `cursor` is `"0"` for this consumer's
    /// pending entries or `">"` for new ones.
    async fn read_batch(
        &self,
        conn: &mut MultiplexedConnection,
        keys: &[String],
        cursor: &str,
    ) -> Result<usize, DomainError> {
        let cursors = vec![cursor; keys.len()];
        let mut options = StreamReadOptions::default()
            .group(&self.config.group, &self.config.consumer)
            .count(self.config.batch_size);
        if cursor == ">" {
            options = options.block(self.config.block.as_millis() as usize);
        }

        let reply: Option<StreamReadReply> = conn
            .xread_options(keys, &cursors, &options)
            .await
            .map_err(bus_error)?;

        let mut handled = 0;
        for stream in reply.map(|r| r.keys).unwrap_or_default() {
            let topic = self.topic_of(&stream.key).to_string();
            for entry in stream.ids {
                self.deliver(&topic, &entry).await;
                conn.xack::<_, _, _, ()>(&stream.key, &self.config.group, &[&entry.id])
                    .await
                    .map_err(bus_error)?;
                handled += 1;
            }
        }
        Ok(handled)
    }

    async fn deliver(&self, topic: &str, entry: &StreamId) {
        let Some(raw) = entry.get::<String>(ENVELOPE_FIELD) else {
            tracing::error!(topic, entry_id = %entry.id, "stream entry without envelope");
            return;
        };
        let envelope: EventEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(topic, entry_id = %entry.id, error = %e, "undecodable envelope");
                return;
            }
        };
        for handler in self.handlers_for(topic) {
            dispatch(handler.as_ref(), envelope.clone()).await;
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let body = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::EventBusError,
                format!("Failed to serialize event: {}", e),
            )
        })?;
        let key = self.stream_key(&event.event_type);

        let mut conn = self.conn.clone();
        let entry_id: String = conn
            .xadd_maxlen(
                &key,
                StreamMaxlen::Approx(self.config.max_len),
                "*",
                &[(ENVELOPE_FIELD, body)],
            )
            .await
            .map_err(bus_error)?;

        tracing::debug!(
            event_type = %event.event_type,
            event_id = %event.event_id,
            entry_id = %entry_id,
            "event published to stream"
        );
        Ok(())
    }
}

impl EventSubscriber for RedisEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers
                .entry(event_type.to_string())
                .or_default()
                .push(handler),
            Err(_) => tracing::error!(event_type, "event bus lock poisoned, subscription dropped"),
        }
    }
}

/// Ids of pending entries `(id, owner, idle_ms)` held by another consumer
/// for at least `min_idle_ms`.
fn claimable<'a>(
    pending: impl IntoIterator<Item = (&'a str, &'a str, usize)>,
    consumer: &str,
    min_idle_ms: usize,
) -> Vec<&'a str> {
    pending
        .into_iter()
        .filter(|(_, owner, idle)| *owner != consumer && *idle >= min_idle_ms)
        .map(|(id, _, _)| id)
        .collect()
}

fn bus_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::EventBusError, format!("Redis error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_consumer_name_survives_a_restart() {
        let before_crash = RedisEventBusConfig::default();
        let after_restart = RedisEventBusConfig::default();
        assert_eq!(before_crash.group, after_restart.group);
        assert_eq!(before_crash.consumer, after_restart.consumer);
        assert!(!before_crash.consumer.is_empty());
        assert_eq!(before_crash.stream_prefix, "yoga:events");
        assert_eq!(before_crash.claim_idle, Duration::from_secs(60));
    }

    #[test]
    fn claimable_takes_only_idle_entries_of_other_consumers() {
        let pending = [
            ("1-0", "pod-a", 120_000),
            ("2-0", "pod-a", 5_000),
            ("3-0", "pod-b", 90_000),
            ("4-0", "pod-b", 60_000),
        ];

        let stale = claimable(pending.iter().copied(), "pod-b", 60_000);
        assert_eq!(stale, vec!["1-0"]);

        let stale = claimable(pending.iter().copied(), "pod-c", 60_000);
        assert_eq!(stale, vec!["1-0", "3-0", "4-0"]);
    }

    #[test]
    fn config_builders_override_fields() {
        let config = RedisEventBusConfig::default()
            .with_group("media")
            .with_consumer("media-1")
            .with_stream_prefix("test");
        assert_eq!(config.group, "media");
        assert_eq!(config.consumer, "media-1");
        assert_eq!(config.stream_prefix, "test");
    }

    #[test]
    fn bus_errors_map_to_event_bus_code() {
        let err = bus_error(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )));
        assert_eq!(err.code, ErrorCode::EventBusError);
    }
}
