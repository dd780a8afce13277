//! UpdateSessionHandler - partial update by the session's trainer.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, ErrorCode, SerializableDomainEvent, SessionId, Timestamp,
};
use crate::domain::session::{SessionChanges, SessionError, SessionUpdated, TrainingSession};
use crate::ports::{EventPublisher, SessionRepository};

/// Command to update a session.
#[derive(Debug, Clone)]
pub struct UpdateSessionCommand {
    pub session_id: SessionId,
    pub changes: SessionChanges,
}

/// Handler for session updates.
///
/// A change touching the venue puts the session back to `Pending` and
/// publishes `session.updated` with the merged venue. Other changes keep
/// whatever status is stored at write time and publish nothing.
pub struct UpdateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UpdateSessionHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<TrainingSession, SessionError> {
        let mut session = self
            .repository
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        session.authorize(&metadata.user_id)?;
        let relocated = session.apply_changes(cmd.changes, Timestamp::now())?;

        // Only a relocation owns the status; anything else must not clobber
        // an outcome applied since the read.
        let written = if relocated {
            self.repository.update(&session).await
        } else {
            self.repository.update_details(&session).await
        };
        written.map_err(|e| {
            if e.code == ErrorCode::SessionNotFound {
                SessionError::not_found(cmd.session_id)
            } else {
                e.into()
            }
        })?;

        if relocated {
            let envelope = metadata.stamp(SessionUpdated::for_session(&session).to_envelope());
            self.event_publisher.publish(envelope).await?;
        } else if let Some(stored) = self.repository.find_by_id(&cmd.session_id).await? {
            session = stored;
        }

        tracing::info!(session_id = %session.id(), relocated, "session updated");

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemorySessionRepository;
    use crate::domain::foundation::{DomainError, UserId};
    use crate::domain::session::{SessionDetails, SessionStatus, Venue, VenueChanges};
    use crate::ports::{Page, SessionFilter};
    use crate::domain::topics;

    async fn seeded(
        status: SessionStatus,
    ) -> (
        Arc<InMemorySessionRepository>,
        Arc<InMemoryEventBus>,
        TrainingSession,
    ) {
        let now = Timestamp::now();
        let mut session = TrainingSession::schedule(
            SessionId::new(),
            UserId::new(),
            SessionDetails {
                title: "Restorative".to_string(),
                description: "Props, bolsters and breath".to_string(),
                max_participants: 6,
                start_time: now.plus_minutes(600),
                duration_minutes: 90,
                price: 120.0,
                notes: None,
            },
            Venue::new(30.0, 31.0, "Old address", "Giza").unwrap(),
            now,
        )
        .unwrap();
        if status != SessionStatus::Pending {
            session.set_status(status).unwrap();
        }
        let repo = Arc::new(InMemorySessionRepository::new());
        repo.save(&session).await.unwrap();
        (repo, Arc::new(InMemoryEventBus::new()), session)
    }

    #[tokio::test]
    async fn venue_change_resets_status_and_publishes_merged_venue() {
        let (repo, bus, session) = seeded(SessionStatus::Upcoming).await;
        let handler = UpdateSessionHandler::new(repo.clone(), bus.clone());

        let updated = handler
            .handle(
                UpdateSessionCommand {
                    session_id: *session.id(),
                    changes: SessionChanges {
                        venue: VenueChanges {
                            address: Some("New address".to_string()),
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                },
                CommandMetadata::new(*session.trainer_id()),
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), SessionStatus::Pending);
        let events = bus.events_of_type(topics::SESSION_UPDATED);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["address"], "New address");
        assert_eq!(events[0].payload["governorate"], "Giza");
        assert_eq!(events[0].payload["latitude"], 30.0);
    }

    #[tokio::test]
    async fn plain_field_change_keeps_status_and_publishes_nothing() {
        let (repo, bus, session) = seeded(SessionStatus::Upcoming).await;
        let handler = UpdateSessionHandler::new(repo.clone(), bus.clone());

        let updated = handler
            .handle(
                UpdateSessionCommand {
                    session_id: *session.id(),
                    changes: SessionChanges {
                        price: Some(99.0),
                        ..Default::default()
                    },
                },
                CommandMetadata::new(*session.trainer_id()),
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), SessionStatus::Upcoming);
        assert_eq!(updated.details().price, 99.0);
        assert_eq!(bus.event_count(), 0);
    }

    /// Hands out the row as read, then lets the location outcome land
    /// before the handler writes.
    struct OutcomeAfterRead {
        inner: Arc<InMemorySessionRepository>,
    }

    #[async_trait::async_trait]
    impl SessionRepository for OutcomeAfterRead {
        async fn save(&self, session: &TrainingSession) -> Result<(), DomainError> {
            self.inner.save(session).await
        }

        async fn update(&self, session: &TrainingSession) -> Result<(), DomainError> {
            self.inner.update(session).await
        }

        async fn update_details(&self, session: &TrainingSession) -> Result<(), DomainError> {
            self.inner.update_details(session).await
        }

        async fn find_by_id(
            &self,
            id: &SessionId,
        ) -> Result<Option<TrainingSession>, DomainError> {
            let read = self.inner.find_by_id(id).await?;
            self.inner
                .transition_status(id, SessionStatus::Pending, SessionStatus::Upcoming)
                .await?;
            Ok(read)
        }

        async fn find_by_trainer(
            &self,
            trainer_id: &UserId,
        ) -> Result<Vec<TrainingSession>, DomainError> {
            self.inner.find_by_trainer(trainer_id).await
        }

        async fn list(
            &self,
            filter: &SessionFilter,
            page: u32,
            limit: u32,
        ) -> Result<Page<TrainingSession>, DomainError> {
            self.inner.list(filter, page, limit).await
        }

        async fn transition_status(
            &self,
            id: &SessionId,
            from: SessionStatus,
            to: SessionStatus,
        ) -> Result<bool, DomainError> {
            self.inner.transition_status(id, from, to).await
        }

        async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn title_edit_does_not_undo_an_outcome_that_landed_after_the_read() {
        let (repo, bus, session) = seeded(SessionStatus::Pending).await;
        let racing = Arc::new(OutcomeAfterRead {
            inner: repo.clone(),
        });
        let handler = UpdateSessionHandler::new(racing, bus.clone());

        let updated = handler
            .handle(
                UpdateSessionCommand {
                    session_id: *session.id(),
                    changes: SessionChanges {
                        title: Some("Restorative Flow".to_string()),
                        ..Default::default()
                    },
                },
                CommandMetadata::new(*session.trainer_id()),
            )
            .await
            .unwrap();

        let stored = repo.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Upcoming);
        assert_eq!(stored.details().title, "Restorative Flow");
        assert_eq!(updated.status(), SessionStatus::Upcoming);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn other_users_are_forbidden() {
        let (repo, bus, session) = seeded(SessionStatus::Pending).await;
        let handler = UpdateSessionHandler::new(repo.clone(), bus);

        let err = handler
            .handle(
                UpdateSessionCommand {
                    session_id: *session.id(),
                    changes: SessionChanges::default(),
                },
                CommandMetadata::new(UserId::new()),
            )
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let handler = UpdateSessionHandler::new(repo, Arc::new(InMemoryEventBus::new()));
        let id = SessionId::new();

        let err = handler
            .handle(
                UpdateSessionCommand {
                    session_id: id,
                    changes: SessionChanges::default(),
                },
                CommandMetadata::new(UserId::new()),
            )
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::NotFound(id));
    }
}
