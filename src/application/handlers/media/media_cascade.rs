//! MediaCascadeHandler - drops photos whose owner is gone.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, OwnerRef};
use crate::domain::session::SessionDeleted;
use crate::domain::topics;
use crate::domain::user::UserDeleted;
use crate::ports::{EventHandler, ObjectStorage, PhotoRepository};

use super::blob_cleanup::discard_photo_blobs;

/// Consumer for `session.deleted` (every photo of the session, any status)
/// and `user.deleted` (the user's profile photo).
pub struct MediaCascadeHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl MediaCascadeHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { photos, storage }
    }

    pub const TOPICS: [&'static str; 2] = [topics::SESSION_DELETED, topics::USER_DELETED];

    fn owner_of(event: &EventEnvelope) -> Result<OwnerRef, DomainError> {
        let malformed = |e: serde_json::Error| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed {} payload: {}", event.event_type, e),
            )
        };
        match event.event_type.as_str() {
            topics::SESSION_DELETED => event
                .payload_as::<SessionDeleted>()
                .map(|p| OwnerRef::session(p.session_id))
                .map_err(malformed),
            topics::USER_DELETED => event
                .payload_as::<UserDeleted>()
                .map(|p| OwnerRef::user(p.user_id))
                .map_err(malformed),
            other => Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Unexpected topic {}", other),
            )),
        }
    }
}

#[async_trait]
impl EventHandler for MediaCascadeHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let owner = Self::owner_of(&event)?;

        match self.photos.delete_by_owner(&owner).await {
            Ok(removed) => {
                discard_photo_blobs(self.storage.as_ref(), &removed, "owner deleted").await;
                tracing::info!(
                    owner = %owner,
                    removed = removed.len(),
                    "photos removed with their owner"
                );
            }
            Err(e) => tracing::error!(
                owner = %owner,
                event_id = %event.event_id,
                error = %e,
                "failed to remove photos of deleted owner"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MediaCascadeHandler"
    }
}
