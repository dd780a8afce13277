//! Command infrastructure for application handlers.
//!
//! Handlers accept a single `CommandMetadata` instead of loose
//! `correlation_id` / `user_id` / `trace_id` parameters, and propagate it
//! onto every envelope they publish.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventEnvelope, UserId};

/// Metadata context for command handlers.
///
/// ```ignore
/// let envelope = event
///     .to_envelope()
///     .with_correlation_id(metadata.correlation_id())
///     .with_user_id(metadata.user_id.to_string());
/// publisher.publish(envelope).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user executing this command (required for authorization).
    pub user_id: UserId,

    /// Links related operations across a single user request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Distributed tracing span/trace ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl CommandMetadata {
    /// Creates new command metadata with required user ID.
    ///
    /// A correlation id is minted immediately so every envelope published by
    /// one command shares it.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: Some(Uuid::new_v4().to_string()),
            trace_id: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add trace ID for distributed tracing.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the trace ID if set.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Stamps correlation, user and trace ids onto an outgoing envelope.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        let envelope = envelope
            .with_correlation_id(self.correlation_id())
            .with_user_id(self.user_id.to_string());
        match self.trace_id() {
            Some(trace_id) => envelope.with_trace_id(trace_id),
            None => envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_mints_stable_correlation_id() {
        let metadata = CommandMetadata::new(UserId::new());
        assert_eq!(metadata.correlation_id(), metadata.correlation_id());
    }

    #[test]
    fn builder_overrides_correlation_id() {
        let metadata = CommandMetadata::new(UserId::new())
            .with_correlation_id("corr-123")
            .with_trace_id("trace-456");

        assert_eq!(metadata.correlation_id(), "corr-123");
        assert_eq!(metadata.trace_id(), Some("trace-456"));
    }

    #[test]
    fn stamp_copies_context_onto_envelope() {
        let user_id = UserId::new();
        let metadata = CommandMetadata::new(user_id)
            .with_correlation_id("corr-1")
            .with_trace_id("trace-1");

        let envelope = metadata.stamp(EventEnvelope::new("a", "1", "A", json!({})));

        assert_eq!(envelope.metadata.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(envelope.metadata.trace_id.as_deref(), Some("trace-1"));
        assert_eq!(envelope.metadata.user_id, Some(user_id.to_string()));
    }
}
