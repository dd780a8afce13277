//! TrainerDeletedHandler - removes the sessions of a deleted user.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventEnvelope, SerializableDomainEvent, SessionId,
};
use crate::domain::session::SessionDeleted;
use crate::domain::user::UserDeleted;
use crate::ports::{EventHandler, EventPublisher, SessionRepository};

/// Consumer for `user.deleted`.
///
/// Deletes every session the user runs as trainer and publishes
/// `session.deleted` for each, so the location and media cascades follow.
/// Sessions already gone are skipped, which keeps redelivery harmless.
pub struct TrainerDeletedHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl TrainerDeletedHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    async fn remove(
        &self,
        session_id: SessionId,
        trigger: &EventEnvelope,
    ) -> Result<(), DomainError> {
        match self.repository.delete(&session_id).await {
            Ok(()) => {}
            Err(e) if e.code == ErrorCode::SessionNotFound => return Ok(()),
            Err(e) => return Err(e),
        }
        let envelope = SessionDeleted::new(session_id)
            .to_envelope()
            .caused_by(trigger);
        self.event_publisher.publish(envelope).await
    }
}

#[async_trait]
impl EventHandler for TrainerDeletedHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload: UserDeleted = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed user.deleted payload: {}", e),
            )
        })?;

        let sessions = match self.repository.find_by_trainer(&payload.user_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!(
                    user_id = %payload.user_id,
                    event_id = %event.event_id,
                    error = %e,
                    "failed to load sessions of deleted user"
                );
                return Ok(());
            }
        };

        for session in &sessions {
            if let Err(e) = self.remove(*session.id(), &event).await {
                tracing::error!(
                    user_id = %payload.user_id,
                    session_id = %session.id(),
                    error = %e,
                    "failed to delete session of deleted user"
                );
            }
        }

        tracing::info!(
            user_id = %payload.user_id,
            sessions = sessions.len(),
            "sessions of deleted user removed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "TrainerDeletedHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemorySessionRepository;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::session::{SessionDetails, TrainingSession, Venue};
    use crate::domain::topics;

    async fn schedule_for(repo: &InMemorySessionRepository, trainer: UserId) -> SessionId {
        let now = Timestamp::now();
        let session = TrainingSession::schedule(
            SessionId::new(),
            trainer,
            SessionDetails {
                title: "Yoga Nidra".to_string(),
                description: "Guided deep relaxation".to_string(),
                max_participants: 30,
                start_time: now.plus_minutes(90),
                duration_minutes: 45,
                price: 60.0,
                notes: None,
            },
            Venue::new(31.2, 29.9, "Stanley", "Alexandria").unwrap(),
            now,
        )
        .unwrap();
        repo.save(&session).await.unwrap();
        *session.id()
    }

    fn user_deleted(user_id: UserId) -> EventEnvelope {
        UserDeleted::new(user_id).to_envelope()
    }

    #[tokio::test]
    async fn deletes_only_the_trainers_sessions_and_announces_each() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let trainer = UserId::new();
        schedule_for(&repo, trainer).await;
        schedule_for(&repo, trainer).await;
        let other = schedule_for(&repo, UserId::new()).await;
        let handler = TrainerDeletedHandler::new(repo.clone(), bus.clone());
        let trigger = user_deleted(trainer);

        handler.handle(trigger.clone()).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_id(&other).await.unwrap().is_some());
        let deleted = bus.events_of_type(topics::SESSION_DELETED);
        assert_eq!(deleted.len(), 2);
        assert!(deleted.iter().all(|e| e.metadata.causation_id.as_deref()
            == Some(trigger.event_id.as_str())));
    }

    #[tokio::test]
    async fn redelivery_is_a_no_op() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let trainer = UserId::new();
        schedule_for(&repo, trainer).await;
        let handler = TrainerDeletedHandler::new(repo.clone(), bus.clone());
        let trigger = user_deleted(trainer);

        handler.handle(trigger.clone()).await.unwrap();
        handler.handle(trigger).await.unwrap();

        assert_eq!(bus.events_of_type(topics::SESSION_DELETED).len(), 1);
    }
}
