//! EventSubscriber port - Interface for subscribing to domain events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations must be:
/// - **Idempotent** - delivery is at-least-once; re-running a handler on the
///   same event must leave the same state
/// - **Self-contained** - operational failures are logged inside the handler;
///   an `Err` is reserved for envelopes the handler cannot decode
///
/// ```ignore
/// #[async_trait]
/// impl EventHandler for LocationOutcomeHandler {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let payload: LocationCreatedSuccess = event.payload_as()?;
///         // ...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "LocationOutcomeHandler"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// ```ignore
/// subscriber.subscribe(topics::SESSION_DELETED, photo_cascade);
/// subscriber.subscribe_all(&[topics::SESSION_CREATED, topics::SESSION_UPDATED], location_sync);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific topic.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple topics.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.subscribe(event_type, handler.clone());
        }
    }
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
