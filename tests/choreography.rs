//! End-to-end event choreography across the three services.
//!
//! Every store is in-memory and every consumer is registered on one
//! `InMemoryEventBus`, so each command runs its whole chain of reactions
//! before returning.

use std::sync::Arc;

use async_trait::async_trait;
use yoga_sessions::adapters::events::InMemoryEventBus;
use yoga_sessions::adapters::memory::{
    InMemoryLocationRepository, InMemoryObjectStorage, InMemoryPhotoRepository,
    InMemorySessionRepository,
};
use yoga_sessions::application::handlers::location::{
    FindNearestSessionsHandler, FindNearestSessionsQuery,
};
use yoga_sessions::application::handlers::media::{
    MediaSettings, RequestPhotoDeletionCommand, RequestPhotoDeletionHandler,
    UploadSessionPhotosCommand, UploadSessionPhotosHandler,
};
use yoga_sessions::application::handlers::session::{
    CreateSessionCommand, CreateSessionHandler, DeleteSessionCommand, DeleteSessionHandler,
    UpdateSessionCommand, UpdateSessionHandler,
};
use yoga_sessions::application::Consumers;
use yoga_sessions::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventId, OwnerRef, PhotoId,
    SerializableDomainEvent, SessionId, Timestamp, UserId,
};
use yoga_sessions::domain::location::{
    Location, LocationWrite, NearbyLocation, NearestQuery, SessionLocationWrite,
};
use yoga_sessions::domain::media::{
    MediaError, PhotoFile, PhotoStatus, SessionImagesCreationApproved,
    SessionImagesCreationRejected, SessionImagesDeletionApproved,
};
use yoga_sessions::domain::session::{
    SessionChanges, SessionDetails, SessionStatus, TrainingSession, Venue, VenueChanges,
};
use yoga_sessions::domain::topics;
use yoga_sessions::domain::user::UserDeleted;
use yoga_sessions::ports::{
    EventPublisher, LocationRepository, PhotoRepository, SessionRepository, Upserted,
};

// =============================================================================
// Fixture
// =============================================================================

struct World {
    bus: Arc<InMemoryEventBus>,
    sessions: Arc<InMemorySessionRepository>,
    locations: Arc<dyn LocationRepository>,
    photos: Arc<InMemoryPhotoRepository>,
    storage: Arc<InMemoryObjectStorage>,
}

impl World {
    fn new() -> Self {
        Self::with_locations(Arc::new(InMemoryLocationRepository::new()))
    }

    fn with_locations(locations: Arc<dyn LocationRepository>) -> Self {
        let world = Self {
            bus: Arc::new(InMemoryEventBus::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            locations,
            photos: Arc::new(InMemoryPhotoRepository::new()),
            storage: Arc::new(InMemoryObjectStorage::new()),
        };
        Consumers::new(
            world.sessions.clone(),
            world.locations.clone(),
            world.photos.clone(),
            world.storage.clone(),
            world.bus.clone(),
        )
        .register(world.bus.as_ref());
        world
    }

    async fn create_session(&self, trainer: UserId, latitude: f64, longitude: f64) -> SessionId {
        let handler = CreateSessionHandler::new(self.sessions.clone(), self.bus.clone());
        let session = handler
            .handle(
                CreateSessionCommand {
                    details: details(),
                    latitude,
                    longitude,
                    address: "26th of July Corridor".to_string(),
                    governorate: "Giza".to_string(),
                },
                CommandMetadata::new(trainer),
            )
            .await
            .unwrap();
        *session.id()
    }

    async fn status_of(&self, id: SessionId) -> SessionStatus {
        self.sessions.find_by_id(&id).await.unwrap().unwrap().status()
    }

    async fn location_of(&self, id: SessionId) -> Option<Location> {
        self.locations
            .find_by_owner(&OwnerRef::session(id))
            .await
            .unwrap()
    }

    fn uploads(&self) -> UploadSessionPhotosHandler {
        UploadSessionPhotosHandler::new(
            self.photos.clone(),
            self.storage.clone(),
            self.bus.clone(),
            MediaSettings::default(),
        )
    }

    async fn upload(
        &self,
        trainer: UserId,
        session_id: SessionId,
        count: usize,
    ) -> Result<Vec<PhotoId>, MediaError> {
        let files = (0..count)
            .map(|i| {
                PhotoFile::new(
                    format!("mat-{}.jpg", i),
                    "image/jpeg",
                    vec![0xFF, 0xD8, i as u8],
                )
            })
            .collect();
        let batch = self
            .uploads()
            .handle(
                UploadSessionPhotosCommand { session_id, files },
                CommandMetadata::new(trainer),
            )
            .await?;
        Ok(batch.photos.iter().map(|p| p.id).collect())
    }

    async fn session_photo_statuses(&self, session_id: SessionId) -> Vec<PhotoStatus> {
        self.photos
            .find_by_owner(&OwnerRef::session(session_id))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.status)
            .collect()
    }
}

fn details() -> SessionDetails {
    SessionDetails {
        title: "Sunrise Vinyasa".to_string(),
        description: "A gentle flow to start the day on the Nile".to_string(),
        max_participants: 12,
        start_time: Timestamp::now().plus_minutes(24 * 60),
        duration_minutes: 60,
        price: 150.0,
        notes: None,
    }
}

/// Location store whose writes always fail.
struct UnavailableLocations(InMemoryLocationRepository);

impl UnavailableLocations {
    fn down() -> DomainError {
        DomainError::new(ErrorCode::DatabaseError, "location store unavailable")
    }
}

#[async_trait]
impl LocationRepository for UnavailableLocations {
    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Option<Location>, DomainError> {
        self.0.find_by_owner(owner).await
    }
    async fn insert(&self, _: &OwnerRef, _: LocationWrite) -> Result<Location, DomainError> {
        Err(Self::down())
    }
    async fn upsert(&self, _: &OwnerRef, _: LocationWrite) -> Result<Upserted, DomainError> {
        Err(Self::down())
    }
    async fn update(&self, _: &OwnerRef, _: LocationWrite) -> Result<Location, DomainError> {
        Err(Self::down())
    }
    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<bool, DomainError> {
        self.0.delete_by_owner(owner).await
    }
    async fn find_nearest_sessions(
        &self,
        query: &NearestQuery,
    ) -> Result<Vec<NearbyLocation>, DomainError> {
        self.0.find_nearest_sessions(query).await
    }
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn created_session_becomes_upcoming_once_location_is_recorded() {
    let world = World::new();
    let trainer = UserId::new();

    let id = world.create_session(trainer, 30.0444, 31.2357).await;

    assert_eq!(world.status_of(id).await, SessionStatus::Upcoming);
    let location = world.location_of(id).await.expect("session location stored");
    assert_eq!(location.governorate(), "Giza");
    assert_eq!(
        world.bus.topics(),
        vec![topics::SESSION_CREATED, topics::LOCATION_CREATED_SUCCESS]
    );

    let outcome = &world.bus.events_of_type(topics::LOCATION_CREATED_SUCCESS)[0];
    let trigger = &world.bus.events_of_type(topics::SESSION_CREATED)[0];
    assert_eq!(
        outcome.metadata.causation_id.as_deref(),
        Some(trigger.event_id.as_str())
    );
}

#[tokio::test]
async fn failed_location_write_marks_session_failed() {
    let world = World::with_locations(Arc::new(UnavailableLocations(
        InMemoryLocationRepository::new(),
    )));

    let id = world.create_session(UserId::new(), 30.0444, 31.2357).await;

    assert_eq!(world.status_of(id).await, SessionStatus::Failed);
    assert!(world.bus.has_event(topics::LOCATION_CREATION_FAILED));
    assert!(world.location_of(id).await.is_none());
}

#[tokio::test]
async fn venue_change_round_trips_through_pending_back_to_upcoming() {
    let world = World::new();
    let trainer = UserId::new();
    let id = world.create_session(trainer, 30.0444, 31.2357).await;
    world.bus.clear();

    let updated = UpdateSessionHandler::new(world.sessions.clone(), world.bus.clone())
        .handle(
            UpdateSessionCommand {
                session_id: id,
                changes: SessionChanges {
                    venue: VenueChanges {
                        latitude: Some(31.2001),
                        longitude: Some(29.9187),
                        address: Some("Corniche".to_string()),
                        governorate: Some("Alexandria".to_string()),
                    },
                    ..Default::default()
                },
            },
            CommandMetadata::new(trainer),
        )
        .await
        .unwrap();

    assert_eq!(updated.status(), SessionStatus::Pending);
    assert_eq!(world.status_of(id).await, SessionStatus::Upcoming);
    assert_eq!(
        world.bus.topics(),
        vec![topics::SESSION_UPDATED, topics::LOCATION_UPDATE_SUCCESS]
    );
    let location = world.location_of(id).await.unwrap();
    assert_eq!(location.governorate(), "Alexandria");
    assert!((location.point().latitude() - 31.2001).abs() < 1e-9);
}

#[tokio::test]
async fn non_venue_change_publishes_nothing() {
    let world = World::new();
    let trainer = UserId::new();
    let id = world.create_session(trainer, 30.0444, 31.2357).await;
    world.bus.clear();

    UpdateSessionHandler::new(world.sessions.clone(), world.bus.clone())
        .handle(
            UpdateSessionCommand {
                session_id: id,
                changes: SessionChanges {
                    price: Some(200.0),
                    ..Default::default()
                },
            },
            CommandMetadata::new(trainer),
        )
        .await
        .unwrap();

    assert_eq!(world.bus.event_count(), 0);
    assert_eq!(world.status_of(id).await, SessionStatus::Upcoming);
}

#[tokio::test]
async fn field_edit_keeps_an_outcome_that_arrived_after_the_read() {
    let world = World::new();
    let trainer = UserId::new();
    let now = Timestamp::now();
    let session = TrainingSession::schedule(
        SessionId::new(),
        trainer,
        details(),
        Venue::new(30.0444, 31.2357, "Zamalek Garden", "Cairo").unwrap(),
        now,
    )
    .unwrap();
    world.sessions.save(&session).await.unwrap();

    // The edit loads the row while it is still Pending...
    let mut loaded = world.sessions.find_by_id(session.id()).await.unwrap().unwrap();
    // ...then the location service answers.
    world
        .bus
        .publish(SessionLocationWrite::Create.success(*session.id()))
        .await
        .unwrap();
    assert_eq!(world.status_of(*session.id()).await, SessionStatus::Upcoming);

    loaded
        .apply_changes(
            SessionChanges {
                title: Some("Sunset Vinyasa".to_string()),
                ..Default::default()
            },
            Timestamp::now(),
        )
        .unwrap();
    world.sessions.update_details(&loaded).await.unwrap();

    assert_eq!(world.status_of(*session.id()).await, SessionStatus::Upcoming);
}

#[tokio::test]
async fn redelivered_location_outcome_is_a_no_op() {
    let world = World::new();
    let id = world.create_session(UserId::new(), 30.0444, 31.2357).await;
    let outcome = world.bus.events_of_type(topics::LOCATION_CREATED_SUCCESS)[0].clone();

    world.bus.publish(outcome).await.unwrap();

    assert_eq!(world.status_of(id).await, SessionStatus::Upcoming);
}

#[tokio::test]
async fn deleting_a_session_cascades_to_location_and_photos() {
    let world = World::new();
    let trainer = UserId::new();
    let id = world.create_session(trainer, 30.0444, 31.2357).await;
    world.upload(trainer, id, 2).await.unwrap();
    assert_eq!(world.storage.len().await, 2);

    DeleteSessionHandler::new(world.sessions.clone(), world.bus.clone())
        .handle(
            DeleteSessionCommand { session_id: id },
            CommandMetadata::new(trainer),
        )
        .await
        .unwrap();

    assert!(world.sessions.find_by_id(&id).await.unwrap().is_none());
    assert!(world.location_of(id).await.is_none());
    assert!(world.session_photo_statuses(id).await.is_empty());
    assert!(world.storage.is_empty().await);
}

#[tokio::test]
async fn user_deletion_removes_every_session_of_the_trainer() {
    let world = World::new();
    let trainer = UserId::new();
    let other = UserId::new();
    let first = world.create_session(trainer, 30.0444, 31.2357).await;
    let second = world.create_session(trainer, 30.0131, 31.2089).await;
    let kept = world.create_session(other, 30.0500, 31.2400).await;

    world
        .bus
        .publish(UserDeleted::new(trainer).to_envelope())
        .await
        .unwrap();

    for id in [first, second] {
        assert!(world.sessions.find_by_id(&id).await.unwrap().is_none());
        assert!(world.location_of(id).await.is_none());
    }
    assert_eq!(world.status_of(kept).await, SessionStatus::Upcoming);
    assert_eq!(world.bus.events_of_type(topics::SESSION_DELETED).len(), 2);
}

#[tokio::test]
async fn nearest_sessions_sees_recorded_venues() {
    let world = World::new();
    let near = world.create_session(UserId::new(), 30.0444, 31.2357).await;
    let far = world.create_session(UserId::new(), 31.2001, 29.9187).await;

    let found = FindNearestSessionsHandler::new(world.locations.clone())
        .handle(FindNearestSessionsQuery {
            latitude: 30.0450,
            longitude: 31.2360,
            radius_km: Some(10.0),
            ..Default::default()
        })
        .await
        .unwrap();

    let owners: Vec<_> = found.iter().map(|n| n.location.owner().owner_id).collect();
    assert_eq!(owners, vec![*near.as_uuid()]);
    assert!(!owners.contains(far.as_uuid()));
}

// =============================================================================
// Photo moderation
// =============================================================================

#[tokio::test]
async fn approved_batch_moves_photos_to_approved() {
    let world = World::new();
    let trainer = UserId::new();
    let session_id = world.create_session(trainer, 30.0444, 31.2357).await;

    let ids = world.upload(trainer, session_id, 2).await.unwrap();
    assert_eq!(
        world.session_photo_statuses(session_id).await,
        vec![PhotoStatus::Pending, PhotoStatus::Pending]
    );
    let request = &world.bus.events_of_type(topics::IMAGES_SESSION_CREATED)[0];
    assert_eq!(request.payload["photoIds"].as_array().map(|a| a.len()), Some(2));

    let approval = SessionImagesCreationApproved {
        event_id: EventId::new(),
        session_id,
        photo_ids: ids,
        occurred_at: Timestamp::now(),
    };
    world.bus.publish(approval.to_envelope()).await.unwrap();

    assert_eq!(
        world.session_photo_statuses(session_id).await,
        vec![PhotoStatus::Approved, PhotoStatus::Approved]
    );
}

#[tokio::test]
async fn rejected_batch_drops_rows_and_blobs() {
    let world = World::new();
    let trainer = UserId::new();
    let session_id = world.create_session(trainer, 30.0444, 31.2357).await;
    let ids = world.upload(trainer, session_id, 2).await.unwrap();

    let rejection = SessionImagesCreationRejected {
        event_id: EventId::new(),
        session_id,
        photo_ids: ids,
        occurred_at: Timestamp::now(),
    };
    world.bus.publish(rejection.to_envelope()).await.unwrap();

    assert!(world.session_photo_statuses(session_id).await.is_empty());
    assert!(world.storage.is_empty().await);
}

#[tokio::test]
async fn photo_budget_allows_three_per_session() {
    let world = World::new();
    let trainer = UserId::new();
    let session_id = world.create_session(trainer, 30.0444, 31.2357).await;
    world.upload(trainer, session_id, 2).await.unwrap();

    let over = world.upload(trainer, session_id, 2).await;
    assert!(matches!(
        over,
        Err(MediaError::LimitExceeded {
            existing: 2,
            requested: 2
        })
    ));
    assert_eq!(world.storage.len().await, 2);

    world.upload(trainer, session_id, 1).await.unwrap();
    assert_eq!(world.session_photo_statuses(session_id).await.len(), 3);
}

#[tokio::test]
async fn deletion_is_requested_then_applied_on_approval() {
    let world = World::new();
    let trainer = UserId::new();
    let session_id = world.create_session(trainer, 30.0444, 31.2357).await;
    let ids = world.upload(trainer, session_id, 1).await.unwrap();
    world
        .bus
        .publish(
            SessionImagesCreationApproved {
                event_id: EventId::new(),
                session_id,
                photo_ids: ids.clone(),
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
        )
        .await
        .unwrap();

    RequestPhotoDeletionHandler::new(world.photos.clone(), world.bus.clone())
        .handle(
            RequestPhotoDeletionCommand {
                session_id,
                photo_ids: ids.clone(),
            },
            CommandMetadata::new(trainer),
        )
        .await
        .unwrap();

    // Only a request so far.
    assert!(world.bus.has_event(topics::IMAGES_SESSION_DELETED));
    assert_eq!(
        world.session_photo_statuses(session_id).await,
        vec![PhotoStatus::Approved]
    );

    world
        .bus
        .publish(
            SessionImagesDeletionApproved {
                event_id: EventId::new(),
                session_id,
                photo_ids: ids,
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
        )
        .await
        .unwrap();

    assert!(world.session_photo_statuses(session_id).await.is_empty());
    assert!(world.storage.is_empty().await);
}
