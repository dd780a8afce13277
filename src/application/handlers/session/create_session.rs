//! CreateSessionHandler - schedules a session and asks for its venue write.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent, SessionId, Timestamp};
use crate::domain::session::{SessionCreated, SessionDetails, SessionError, TrainingSession, Venue};
use crate::ports::{EventPublisher, SessionRepository};

/// Command to schedule a new session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub details: SessionDetails,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
}

/// Handler for creating sessions.
///
/// The session is stored `Pending` and stays there until the location
/// service reports on `session.created`.
pub struct CreateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateSessionHandler {
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
        cmd: CreateSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<TrainingSession, SessionError> {
        let venue = Venue::new(cmd.latitude, cmd.longitude, cmd.address, cmd.governorate)?;
        let session = TrainingSession::schedule(
            SessionId::new(),
            metadata.user_id,
            cmd.details,
            venue,
            Timestamp::now(),
        )?;

        self.repository.save(&session).await?;

        let envelope = metadata.stamp(SessionCreated::for_session(&session).to_envelope());
        self.event_publisher.publish(envelope).await?;

        tracing::info!(
            session_id = %session.id(),
            trainer_id = %session.trainer_id(),
            "session created"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemorySessionRepository;
    use crate::domain::foundation::{DomainError, ErrorCode, UserId};
    use crate::domain::session::SessionStatus;
    use crate::domain::topics;
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(
            &self,
            _event: crate::domain::foundation::EventEnvelope,
        ) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::EventBusError, "bus down"))
        }
    }

    fn command() -> CreateSessionCommand {
        CreateSessionCommand {
            details: SessionDetails {
                title: "Power Yoga".to_string(),
                description: "Strength-focused vinyasa flow".to_string(),
                max_participants: 15,
                start_time: Timestamp::now().plus_minutes(24 * 60),
                duration_minutes: 60,
                price: 200.0,
                notes: Some("Bring a mat".to_string()),
            },
            latitude: 30.04,
            longitude: 31.23,
            address: "12 Tahrir Sq".to_string(),
            governorate: "Cairo".to_string(),
        }
    }

    #[tokio::test]
    async fn persists_pending_session_and_publishes_venue() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = CreateSessionHandler::new(repo.clone(), bus.clone());
        let trainer = UserId::new();

        let session = handler
            .handle(command(), CommandMetadata::new(trainer))
            .await
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Pending);
        assert_eq!(session.trainer_id(), &trainer);
        assert!(repo.find_by_id(session.id()).await.unwrap().is_some());

        let events = bus.events_of_type(topics::SESSION_CREATED);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            json!({
                "sessionId": session.id().to_string(),
                "latitude": 30.04,
                "longitude": 31.23,
                "address": "12 Tahrir Sq",
                "governorate": "Cairo",
            })
        );
        assert_eq!(
            events[0].metadata.user_id.as_deref(),
            Some(trainer.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn invalid_venue_is_rejected_before_saving() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = CreateSessionHandler::new(repo.clone(), bus.clone());

        let mut cmd = command();
        cmd.latitude = 123.0;
        let err = handler
            .handle(cmd, CommandMetadata::new(UserId::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::ValidationFailed { .. }));
        assert!(repo.is_empty().await);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn past_start_time_is_rejected() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let handler = CreateSessionHandler::new(repo.clone(), Arc::new(InMemoryEventBus::new()));

        let mut cmd = command();
        cmd.details.start_time = Timestamp::now().minus_minutes(5);

        assert!(handler
            .handle(cmd, CommandMetadata::new(UserId::new()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn bus_failure_surfaces_as_infrastructure_error() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let handler = CreateSessionHandler::new(repo, Arc::new(FailingPublisher));

        let err = handler
            .handle(command(), CommandMetadata::new(UserId::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Infrastructure(_)));
    }
}
