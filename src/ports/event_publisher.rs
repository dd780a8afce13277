//! EventPublisher port - Interface for publishing domain events.
//!
//! Services talk to each other only through this port. The transport
//! (in-process dispatch, Redis Streams) is an adapter concern.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - A failing subscriber never fails the publisher
/// - Transport errors are propagated to the caller
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event on the topic named by `event.event_type`.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Stops at the first transport error; events already handed to the
    /// transport stay published.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingPublisher {
        topics: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
            if Some(event.event_type.as_str()) == self.fail_on {
                return Err(DomainError::new(
                    crate::domain::foundation::ErrorCode::EventBusError,
                    "broker unavailable",
                ));
            }
            self.topics.lock().unwrap().push(event.event_type);
            Ok(())
        }
    }

    fn envelope(topic: &str) -> EventEnvelope {
        EventEnvelope::new(topic, "agg", "Test", json!({}))
    }

    #[tokio::test]
    async fn publish_all_keeps_order() {
        let publisher = RecordingPublisher {
            topics: Mutex::new(Vec::new()),
            fail_on: None,
        };

        publisher
            .publish_all(vec![envelope("a"), envelope("b"), envelope("c")])
            .await
            .unwrap();

        assert_eq!(*publisher.topics.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn publish_all_stops_at_first_error() {
        let publisher = RecordingPublisher {
            topics: Mutex::new(Vec::new()),
            fail_on: Some("b"),
        };

        let result = publisher
            .publish_all(vec![envelope("a"), envelope("b"), envelope("c")])
            .await;

        assert!(result.is_err());
        assert_eq!(*publisher.topics.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn event_publisher_is_object_safe() {
        fn _accepts_dyn(_: &dyn EventPublisher) {}
    }
}
