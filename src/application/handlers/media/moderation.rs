//! ModerationHandler - applies moderation decisions to session photos.
//!
//! Every decision is guarded by the photo's current status, so replays and
//! decisions about photos that are already gone change nothing.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventEnvelope, OwnerRef, PhotoId, SessionId,
};
use crate::domain::media::PhotoStatus;
use crate::domain::topics;
use crate::ports::{EventHandler, ObjectStorage, PhotoRepository};

use super::blob_cleanup::discard_photo_blobs;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionPayload {
    session_id: SessionId,
    #[serde(default)]
    photo_ids: Vec<PhotoId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    CreationApproved,
    CreationRejected,
    DeletionApproved,
    DeletionRejected,
}

impl Decision {
    fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            topics::SESSION_IMAGES_CREATION_APPROVED => Some(Decision::CreationApproved),
            topics::SESSION_IMAGES_CREATION_REJECTED => Some(Decision::CreationRejected),
            topics::SESSION_IMAGES_DELETION_APPROVED => Some(Decision::DeletionApproved),
            topics::SESSION_IMAGES_DELETION_REJECTED => Some(Decision::DeletionRejected),
            _ => None,
        }
    }
}

/// Consumer for the four `session.images.*` decision topics.
pub struct ModerationHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl ModerationHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { photos, storage }
    }

    pub const TOPICS: [&'static str; 4] = [
        topics::SESSION_IMAGES_CREATION_APPROVED,
        topics::SESSION_IMAGES_CREATION_REJECTED,
        topics::SESSION_IMAGES_DELETION_APPROVED,
        topics::SESSION_IMAGES_DELETION_REJECTED,
    ];

    /// Returns how many photos the decision touched.
    async fn apply(
        &self,
        decision: Decision,
        payload: &DecisionPayload,
    ) -> Result<usize, DomainError> {
        let owner = OwnerRef::session(payload.session_id);
        let ids = &payload.photo_ids;
        match decision {
            Decision::CreationApproved => Ok(self.photos.approve(&owner, ids).await?.len()),
            Decision::CreationRejected => {
                self.remove(&owner, ids, PhotoStatus::Pending, "photo rejected")
                    .await
            }
            Decision::DeletionApproved => {
                self.remove(&owner, ids, PhotoStatus::Approved, "photo deletion approved")
                    .await
            }
            Decision::DeletionRejected => Ok(0),
        }
    }

    async fn remove(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
        status: PhotoStatus,
        reason: &'static str,
    ) -> Result<usize, DomainError> {
        let removed = self.photos.delete_with_status(owner, ids, status).await?;
        discard_photo_blobs(self.storage.as_ref(), &removed, reason).await;
        Ok(removed.len())
    }
}

#[async_trait]
impl EventHandler for ModerationHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let decision = Decision::from_topic(&event.event_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Unexpected topic {}", event.event_type),
            )
        })?;
        let payload: DecisionPayload = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed {} payload: {}", event.event_type, e),
            )
        })?;

        match self.apply(decision, &payload).await {
            Ok(changed) => tracing::info!(
                session_id = %payload.session_id,
                photo_ids = ?payload.photo_ids,
                topic = %event.event_type,
                changed,
                "moderation decision applied"
            ),
            Err(e) => tracing::error!(
                session_id = %payload.session_id,
                photo_ids = ?payload.photo_ids,
                topic = %event.event_type,
                event_id = %event.event_id,
                error = %e,
                "failed to apply moderation decision"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ModerationHandler"
    }
}
