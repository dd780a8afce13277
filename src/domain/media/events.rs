//! Media events.
//!
//! Outbound requests to the moderation authority (`images.session.*`) and the
//! decisions it sends back (`session.images.*`). Photo ids are the integer
//! ids assigned by the media store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, PhotoId, SessionId, Timestamp, UserId};
use crate::domain::topics;

// ════════════════════════════════════════════════════════════════════════════
// ImagesSessionCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published once per upload batch with the ids of every photo stored as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesSessionCreated {
    #[serde(skip)]
    pub event_id: EventId,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    ImagesSessionCreated,
    event_type = topics::IMAGES_SESSION_CREATED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ImagesSessionDeleted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a trainer asks for approved photos to be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesSessionDeleted {
    #[serde(skip)]
    pub event_id: EventId,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    ImagesSessionDeleted,
    event_type = topics::IMAGES_SESSION_DELETED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionImagesCreationApproved
// ════════════════════════════════════════════════════════════════════════════

/// Moderation accepted pending photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionImagesCreationApproved {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    SessionImagesCreationApproved,
    event_type = topics::SESSION_IMAGES_CREATION_APPROVED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionImagesCreationRejected
// ════════════════════════════════════════════════════════════════════════════

/// Moderation refused pending photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionImagesCreationRejected {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    SessionImagesCreationRejected,
    event_type = topics::SESSION_IMAGES_CREATION_REJECTED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionImagesDeletionApproved
// ════════════════════════════════════════════════════════════════════════════

/// Moderation agreed to remove approved photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionImagesDeletionApproved {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    SessionImagesDeletionApproved,
    event_type = topics::SESSION_IMAGES_DELETION_APPROVED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionImagesDeletionRejected
// ════════════════════════════════════════════════════════════════════════════

/// Moderation refused a deletion request. Carries the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionImagesDeletionRejected {
    #[serde(skip)]
    pub event_id: EventId,
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    SessionImagesDeletionRejected,
    event_type = topics::SESSION_IMAGES_DELETION_REJECTED,
    aggregate_id = session_id,
    aggregate_type = "SessionPhotos",
    occurred_at = occurred_at,
    event_id = event_id
);

impl ImagesSessionCreated {
    pub fn new(user_id: UserId, session_id: SessionId, photo_ids: Vec<PhotoId>) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            session_id,
            photo_ids,
            occurred_at: Timestamp::now(),
        }
    }
}

impl ImagesSessionDeleted {
    pub fn new(user_id: UserId, session_id: SessionId, photo_ids: Vec<PhotoId>) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            session_id,
            photo_ids,
            occurred_at: Timestamp::now(),
        }
    }
}
