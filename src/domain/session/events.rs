//! Session events published by the sessions service.
//!
//! - `SessionCreated` - asks the location service to record the venue
//! - `SessionUpdated` - asks the location service to move the venue
//! - `SessionDeleted` - lets location and media drop dependent records

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, SessionId, Timestamp};
use crate::domain::topics;

use super::TrainingSession;

// ════════════════════════════════════════════════════════════════════════════
// SessionCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published after a new session has been persisted in `Pending` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

impl SessionCreated {
    pub fn for_session(session: &TrainingSession) -> Self {
        let venue = session.venue();
        Self {
            event_id: EventId::new(),
            session_id: *session.id(),
            latitude: venue.point().latitude(),
            longitude: venue.point().longitude(),
            address: venue.address().to_string(),
            governorate: venue.governorate().to_string(),
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    SessionCreated,
    event_type = topics::SESSION_CREATED,
    aggregate_id = session_id,
    aggregate_type = "Session",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionUpdated
// ════════════════════════════════════════════════════════════════════════════

/// Published after a session's venue changed. Carries the full merged venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdated {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

impl SessionUpdated {
    pub fn for_session(session: &TrainingSession) -> Self {
        let venue = session.venue();
        Self {
            event_id: EventId::new(),
            session_id: *session.id(),
            latitude: venue.point().latitude(),
            longitude: venue.point().longitude(),
            address: venue.address().to_string(),
            governorate: venue.governorate().to_string(),
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    SessionUpdated,
    event_type = topics::SESSION_UPDATED,
    aggregate_id = session_id,
    aggregate_type = "Session",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionDeleted
// ════════════════════════════════════════════════════════════════════════════

/// Published after a session row has been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDeleted {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

impl SessionDeleted {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            event_id: EventId::new(),
            session_id,
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    SessionDeleted,
    event_type = topics::SESSION_DELETED,
    aggregate_id = session_id,
    aggregate_type = "Session",
    occurred_at = occurred_at,
    event_id = event_id
);
