//! Event infrastructure for domain event publishing and handling.
//!
//! - `EventId` - Unique identifier for a published event
//! - `EventMetadata` - Tracing and correlation context
//! - `EventEnvelope` - Transport wrapper carried by the event bus
//! - `DomainEvent` - Trait that all event contracts implement
//! - `domain_event!` - Macro to simplify DomainEvent implementations

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

// ============================================
// DomainEvent Trait
// ============================================

/// Trait that all domain events must implement.
///
/// `event_type` is the bus topic the event is published on. For types that
/// also implement `Serialize`, `to_envelope()` is available through
/// `SerializableDomainEvent`.
pub trait DomainEvent: Send + Sync {
    /// Returns the topic, e.g. `session.created`.
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate the event is about.
    fn aggregate_id(&self) -> String;

    /// Returns the type of aggregate (e.g., "Session", "Location").
    fn aggregate_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> Timestamp;

    /// Returns the unique ID for this event instance.
    fn event_id(&self) -> EventId;
}

/// Extension trait that provides `to_envelope()` for serializable domain events.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    /// Converts this domain event into an `EventEnvelope` for transport.
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Implements `DomainEvent` for a contract struct.
///
/// ```ignore
/// domain_event!(
///     SessionDeleted,
///     event_type = topics::SESSION_DELETED,
///     aggregate_id = session_id,
///     aggregate_type = "Session",
///     occurred_at = occurred_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        aggregate_id = $agg_id_field:ident,
        aggregate_type = $agg_type:expr,
        occurred_at = $occurred_field:ident,
        event_id = $event_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$agg_id_field.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $agg_type
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_field
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$event_id_field.clone()
            }
        }
    };
}

pub use domain_event;

/// Unique identifier for events.
///
/// A String internally so ids minted by other services (UUID, ULID, stream
/// entry ids) survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for tracing and correlation.
///
/// - `correlation_id` - Links every event of one saga together
/// - `causation_id` - ID of the event that caused this one
/// - `user_id` - User who triggered this event chain
/// - `trace_id` - Distributed tracing identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Transport envelope for domain events.
///
/// `event_type` doubles as the bus topic. `payload` holds the camelCase
/// contract body and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance.
    pub event_id: EventId,

    /// Topic the event is routed on (e.g., "session.created").
    pub event_type: String,

    /// Schema version number (extracted from a `.vN` topic suffix, default 1).
    pub schema_version: u32,

    /// ID of the aggregate the event is about.
    pub aggregate_id: String,

    /// Type of aggregate (e.g., "Session", "Photo").
    pub aggregate_type: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    /// Tracing and correlation metadata.
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Creates a new EventEnvelope with required fields.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        let schema_version = Self::extract_version(&event_type);

        Self {
            event_id: EventId::new(),
            event_type,
            schema_version,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Extracts version number from event_type string.
    ///
    /// `"session.created.v2"` gives 2; topics without a suffix are version 1.
    pub(crate) fn extract_version(event_type: &str) -> u32 {
        event_type
            .rsplit_once(".v")
            .and_then(|(_, version_str)| version_str.parse::<u32>().ok())
            .unwrap_or(1)
    }

    /// Creates an envelope from a domain event with automatic serialization.
    pub fn from_event<T>(event: &T) -> Self
    where
        T: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type().to_string();
        let schema_version = Self::extract_version(&event_type);
        // Payload structs hold only ids, strings and numbers.
        let payload = serde_json::to_value(event).unwrap_or_else(|e| {
            tracing::error!(event_type = %event_type, error = %e, "event payload not serializable");
            serde_json::Value::Null
        });

        Self {
            event_id: event.event_id(),
            event_type,
            schema_version,
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add causation ID (ID of event that caused this one).
    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.causation_id = Some(id.into());
        self
    }

    /// Add user ID for audit.
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }

    /// Add trace ID for distributed tracing.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.trace_id = Some(id.into());
        self
    }

    /// Marks this envelope as a reaction to `trigger`.
    ///
    /// Sets the causation id to the trigger's event id and carries its
    /// correlation, user and trace ids forward.
    pub fn caused_by(mut self, trigger: &EventEnvelope) -> Self {
        self.metadata.causation_id = Some(trigger.event_id.as_str().to_string());
        self.metadata.correlation_id = trigger
            .metadata
            .correlation_id
            .clone()
            .or_else(|| Some(trigger.event_id.as_str().to_string()));
        if self.metadata.user_id.is_none() {
            self.metadata.user_id = trigger.metadata.user_id.clone();
        }
        if self.metadata.trace_id.is_none() {
            self.metadata.trace_id = trigger.metadata.trace_id.clone();
        }
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
