//! Event consumers of the three services and their topic subscriptions.

use std::sync::Arc;

use crate::domain::topics;
use crate::ports::{
    EventPublisher, EventSubscriber, LocationRepository, ObjectStorage, PhotoRepository,
    SessionRepository,
};

use super::handlers::location::{LocationCascadeHandler, SessionLocationSyncHandler};
use super::handlers::media::{MediaCascadeHandler, ModerationHandler};
use super::handlers::session::{LocationOutcomeHandler, TrainerDeletedHandler};

/// Every consumer, built once at start-up.
///
/// ```ignore
/// let consumers = Consumers::new(sessions, locations, photos, storage, bus.clone());
/// consumers.register(bus.as_ref());
/// ```
pub struct Consumers {
    pub location_outcome: Arc<LocationOutcomeHandler>,
    pub trainer_deleted: Arc<TrainerDeletedHandler>,
    pub session_location_sync: Arc<SessionLocationSyncHandler>,
    pub location_cascade: Arc<LocationCascadeHandler>,
    pub moderation: Arc<ModerationHandler>,
    pub media_cascade: Arc<MediaCascadeHandler>,
}

impl Consumers {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        locations: Arc<dyn LocationRepository>,
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn ObjectStorage>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            location_outcome: Arc::new(LocationOutcomeHandler::new(sessions.clone())),
            trainer_deleted: Arc::new(TrainerDeletedHandler::new(
                sessions,
                event_publisher.clone(),
            )),
            session_location_sync: Arc::new(SessionLocationSyncHandler::new(
                locations.clone(),
                event_publisher,
            )),
            location_cascade: Arc::new(LocationCascadeHandler::new(locations)),
            moderation: Arc::new(ModerationHandler::new(photos.clone(), storage.clone())),
            media_cascade: Arc::new(MediaCascadeHandler::new(photos, storage)),
        }
    }

    /// Subscribes each consumer to the topics it reacts to.
    pub fn register(&self, subscriber: &dyn EventSubscriber) {
        // sessions
        subscriber.subscribe_all(&LocationOutcomeHandler::TOPICS, self.location_outcome.clone());
        subscriber.subscribe(topics::USER_DELETED, self.trainer_deleted.clone());
        // location
        subscriber.subscribe_all(
            &SessionLocationSyncHandler::TOPICS,
            self.session_location_sync.clone(),
        );
        subscriber.subscribe_all(&LocationCascadeHandler::TOPICS, self.location_cascade.clone());
        // media
        subscriber.subscribe_all(&ModerationHandler::TOPICS, self.moderation.clone());
        subscriber.subscribe_all(&MediaCascadeHandler::TOPICS, self.media_cascade.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryLocationRepository, InMemoryObjectStorage, InMemoryPhotoRepository,
        InMemorySessionRepository,
    };

    #[test]
    fn registers_every_consumed_topic() {
        let bus = Arc::new(InMemoryEventBus::new());
        let consumers = Consumers::new(
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryLocationRepository::new()),
            Arc::new(InMemoryPhotoRepository::new()),
            Arc::new(InMemoryObjectStorage::new()),
            bus.clone(),
        );

        consumers.register(bus.as_ref());

        let mut subscribed = bus.subscribed_topics();
        subscribed.sort();
        let mut expected = vec![
            topics::LOCATION_CREATED_SUCCESS,
            topics::LOCATION_CREATION_FAILED,
            topics::LOCATION_UPDATE_SUCCESS,
            topics::LOCATION_UPDATE_FAILED,
            topics::USER_DELETED,
            topics::SESSION_CREATED,
            topics::SESSION_UPDATED,
            topics::SESSION_DELETED,
            topics::SESSION_IMAGES_CREATION_APPROVED,
            topics::SESSION_IMAGES_CREATION_REJECTED,
            topics::SESSION_IMAGES_DELETION_APPROVED,
            topics::SESSION_IMAGES_DELETION_REJECTED,
        ];
        expected.sort();
        assert_eq!(subscribed, expected);
    }
}
