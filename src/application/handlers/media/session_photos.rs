//! Reads and deletion requests for session photos.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, OwnerRef, PhotoId, SerializableDomainEvent, SessionId,
};
use crate::domain::media::{ImagesSessionDeleted, MediaError, Photo, PhotoStatus};
use crate::ports::{EventPublisher, PhotoRepository};

/// Handler for `GET /media/sessions/:sessionId`. Only approved photos are visible.
pub struct ListSessionPhotosHandler {
    photos: Arc<dyn PhotoRepository>,
}

impl ListSessionPhotosHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>) -> Self {
        Self { photos }
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<Vec<Photo>, MediaError> {
        let photos = self.photos.find_by_owner(&OwnerRef::session(session_id)).await?;
        Ok(photos
            .into_iter()
            .filter(|p| p.status == PhotoStatus::Approved)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct RequestPhotoDeletionCommand {
    pub session_id: SessionId,
    pub photo_ids: Vec<PhotoId>,
}

/// Handler for `DELETE /media/sessions/:sessionId/photos`.
///
/// Nothing is deleted here: the request goes to moderation as
/// `images.session.deleted` and the rows go once deletion is approved.
pub struct RequestPhotoDeletionHandler {
    photos: Arc<dyn PhotoRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RequestPhotoDeletionHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            photos,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestPhotoDeletionCommand,
        metadata: CommandMetadata,
    ) -> Result<Vec<PhotoId>, MediaError> {
        let requested: Vec<PhotoId> = cmd
            .photo_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if requested.is_empty() {
            return Err(MediaError::validation("photoIds", "At least one photo id is required"));
        }

        let owner = OwnerRef::session(cmd.session_id);
        let approved: BTreeSet<PhotoId> = self
            .photos
            .find_by_ids(&owner, &requested)
            .await?
            .into_iter()
            .filter(|p| p.status == PhotoStatus::Approved)
            .map(|p| p.id)
            .collect();
        let missing: Vec<String> = requested
            .iter()
            .filter(|id| !approved.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MediaError::not_found(format!(
                "No approved photos {} for session {}",
                missing.join(","),
                cmd.session_id
            )));
        }

        let event = ImagesSessionDeleted::new(metadata.user_id, cmd.session_id, requested.clone());
        self.event_publisher
            .publish(metadata.stamp(event.to_envelope()))
            .await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %metadata.user_id,
            photo_ids = ?requested,
            "photo deletion requested"
        );
        Ok(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryPhotoRepository;
    use crate::domain::foundation::UserId;
    use crate::domain::media::NewPhoto;
    use crate::domain::topics;

    async fn stored(
        repo: &InMemoryPhotoRepository,
        session_id: SessionId,
        status: PhotoStatus,
    ) -> PhotoId {
        repo.insert(NewPhoto {
            owner: OwnerRef::session(session_id),
            url: "memory://sessions/x.png".to_string(),
            storage_key: "sessions/x.png".to_string(),
            filename: "x.png".to_string(),
            mimetype: "image/png".to_string(),
            status,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn listing_hides_pending_photos() {
        let repo = Arc::new(InMemoryPhotoRepository::new());
        let session_id = SessionId::new();
        let approved = stored(&repo, session_id, PhotoStatus::Approved).await;
        stored(&repo, session_id, PhotoStatus::Pending).await;

        let photos = ListSessionPhotosHandler::new(repo).handle(session_id).await.unwrap();

        assert_eq!(photos.iter().map(|p| p.id).collect::<Vec<_>>(), vec![approved]);
    }

    #[tokio::test]
    async fn deletion_request_emits_event_and_keeps_rows() {
        let repo = Arc::new(InMemoryPhotoRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let session_id = SessionId::new();
        let id = stored(&repo, session_id, PhotoStatus::Approved).await;
        let handler = RequestPhotoDeletionHandler::new(repo.clone(), bus.clone());

        let ids = handler
            .handle(
                RequestPhotoDeletionCommand {
                    session_id,
                    photo_ids: vec![id, id],
                },
                CommandMetadata::new(UserId::new()),
            )
            .await
            .unwrap();

        assert_eq!(ids, vec![id]);
        assert_eq!(repo.all().await.len(), 1);
        let events = bus.events_of_type(topics::IMAGES_SESSION_DELETED);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["photoIds"], serde_json::json!([id.value()]));
    }

    #[tokio::test]
    async fn deletion_request_rejects_pending_or_foreign_ids() {
        let repo = Arc::new(InMemoryPhotoRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let session_id = SessionId::new();
        let pending = stored(&repo, session_id, PhotoStatus::Pending).await;
        let foreign = stored(&repo, SessionId::new(), PhotoStatus::Approved).await;
        let handler = RequestPhotoDeletionHandler::new(repo, bus.clone());

        for id in [pending, foreign] {
            let err = handler
                .handle(
                    RequestPhotoDeletionCommand {
                        session_id,
                        photo_ids: vec![id],
                    },
                    CommandMetadata::new(UserId::new()),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, MediaError::NotFound(_)));
        }
        assert_eq!(bus.event_count(), 0);
    }
}
