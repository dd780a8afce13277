//! In-process event bus.
//!
//! Delivers each published envelope to the handlers subscribed to its topic
//! before `publish` returns, in subscription order. Handler failures are
//! logged and never reach the publisher. Used for single-process runs and
//! as the deterministic bus in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// In-process event bus with envelope capture for assertions.
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe(topics::SESSION_CREATED, sync_handler);
/// bus.publish(envelope).await?;
///
/// assert!(bus.has_event("location.created.success"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns every envelope published so far, in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Topics in publish order.
    pub fn topics(&self) -> Vec<String> {
        self.published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }

    /// Topics with at least one subscriber.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.handlers
            .read()
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clears captured events. Subscriptions are kept.
    pub fn clear(&self) {
        if let Ok(mut events) = self.published.write() {
            events.clear();
        }
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Checks if a specific event type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .map(|events| events.iter().any(|e| e.event_type == event_type))
            .unwrap_or(false)
    }

    fn lock_error() -> DomainError {
        DomainError::new(ErrorCode::EventBusError, "event bus lock poisoned")
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `handler` on `event`, logging instead of propagating a failure.
pub(crate) async fn dispatch(handler: &dyn EventHandler, event: EventEnvelope) {
    let event_id = event.event_id.clone();
    let event_type = event.event_type.clone();
    match handler.handle(event).await {
        Ok(()) => tracing::debug!(
            handler = handler.name(),
            event_type = %event_type,
            event_id = %event_id,
            "event handled"
        ),
        Err(e) => tracing::error!(
            handler = handler.name(),
            event_type = %event_type,
            event_id = %event_id,
            error = %e,
            "event handler failed"
        ),
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .map_err(|_| Self::lock_error())?
            .push(event.clone());

        // Clone handlers to release lock before await points
        let type_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.read().map_err(|_| Self::lock_error())?;
            handlers
                .get(&event.event_type)
                .cloned()
                .unwrap_or_default()
        };

        tracing::debug!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            handlers = type_handlers.len(),
            "publishing event"
        );

        for handler in type_handlers {
            dispatch(handler.as_ref(), event.clone()).await;
        }

        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
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
