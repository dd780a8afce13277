//! DeleteSessionHandler - removes a session at its trainer's request.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, ErrorCode, SerializableDomainEvent, SessionId};
use crate::domain::session::{SessionDeleted, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
}

/// Handler for deleting sessions. Publishes `session.deleted` so location
/// and media drop what they hold for it.
pub struct DeleteSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl DeleteSessionHandler {
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
        cmd: DeleteSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<(), SessionError> {
        let session = self
            .repository
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        session.authorize(&metadata.user_id)?;

        self.repository.delete(&cmd.session_id).await.map_err(|e| {
            if e.code == ErrorCode::SessionNotFound {
                SessionError::not_found(cmd.session_id)
            } else {
                e.into()
            }
        })?;

        let envelope = metadata.stamp(SessionDeleted::new(cmd.session_id).to_envelope());
        self.event_publisher.publish(envelope).await?;

        tracing::info!(session_id = %cmd.session_id, "session deleted");
        Ok(())
    }
}
