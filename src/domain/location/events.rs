//! Location outcome events.
//!
//! The location service reports the result of every session-owned write so
//! the sessions service can settle the session's `Pending` status. Payloads
//! carry only the session id (and a reason on failure).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, EventEnvelope, EventId, SerializableDomainEvent, SessionId, Timestamp,
};
use crate::domain::topics;

// ════════════════════════════════════════════════════════════════════════════
// LocationCreatedSuccess
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCreatedSuccess {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    LocationCreatedSuccess,
    event_type = topics::LOCATION_CREATED_SUCCESS,
    aggregate_id = session_id,
    aggregate_type = "Location",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// LocationCreationFailed
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCreationFailed {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub reason: String,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    LocationCreationFailed,
    event_type = topics::LOCATION_CREATION_FAILED,
    aggregate_id = session_id,
    aggregate_type = "Location",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// LocationUpdateSuccess
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateSuccess {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    LocationUpdateSuccess,
    event_type = topics::LOCATION_UPDATE_SUCCESS,
    aggregate_id = session_id,
    aggregate_type = "Location",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// LocationUpdateFailed
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateFailed {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub reason: String,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    LocationUpdateFailed,
    event_type = topics::LOCATION_UPDATE_FAILED,
    aggregate_id = session_id,
    aggregate_type = "Location",
    occurred_at = occurred_at,
    event_id = event_id
);

/// Which session write a location operation answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLocationWrite {
    Create,
    Update,
}

impl SessionLocationWrite {
    /// Envelope reporting a successful write.
    pub fn success(&self, session_id: SessionId) -> EventEnvelope {
        match self {
            SessionLocationWrite::Create => LocationCreatedSuccess {
                event_id: EventId::new(),
                session_id,
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
            SessionLocationWrite::Update => LocationUpdateSuccess {
                event_id: EventId::new(),
                session_id,
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
        }
    }

    /// Envelope reporting a failed write.
    pub fn failure(
        &self,
        session_id: SessionId,
        reason: impl Into<String>,
    ) -> EventEnvelope {
        let reason = reason.into();
        match self {
            SessionLocationWrite::Create => LocationCreationFailed {
                event_id: EventId::new(),
                session_id,
                reason,
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
            SessionLocationWrite::Update => LocationUpdateFailed {
                event_id: EventId::new(),
                session_id,
                reason,
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_outcomes_use_creation_topics() {
        let id = SessionId::new();
        assert_eq!(
            SessionLocationWrite::Create.success(id).event_type,
            "location.created.success"
        );
        assert_eq!(
            SessionLocationWrite::Create.failure(id, "x").event_type,
            "location.creation.failed"
        );
    }

    #[test]
    fn update_outcomes_use_update_topics() {
        let id = SessionId::new();
        assert_eq!(
            SessionLocationWrite::Update.success(id).event_type,
            "location.update.success"
        );
        assert_eq!(
            SessionLocationWrite::Update.failure(id, "x").event_type,
            "location.update.failed"
        );
    }

    #[test]
    fn success_payload_carries_only_session_id() {
        let id = SessionId::new();
        let envelope = SessionLocationWrite::Create.success(id);
        assert_eq!(envelope.payload, json!({ "sessionId": id.to_string() }));
    }

    #[test]
    fn failure_payload_carries_reason() {
        let id = SessionId::new();
        let envelope = SessionLocationWrite::Update.failure(id, "latitude out of range");
        let decoded: LocationUpdateFailed = envelope.payload_as().unwrap();
        assert_eq!(decoded.session_id, id);
        assert_eq!(decoded.reason, "latitude out of range");
    }
}
