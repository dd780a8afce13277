//! LocationOutcomeHandler - applies location write outcomes to sessions.
//!
//! Subscribed to the four `location.*` outcome topics. Each outcome only
//! moves a session that is still `Pending`; the flip is a compare-and-set
//! on the stored status, so redelivered or late outcomes are no-ops.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, SessionId};
use crate::domain::session::{LocationOutcome, SessionStatus};
use crate::domain::topics;
use crate::ports::{EventHandler, SessionRepository};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomePayload {
    session_id: SessionId,
    #[serde(default)]
    reason: Option<String>,
}

/// Consumer for `location.created.success`, `location.creation.failed`,
/// `location.update.success` and `location.update.failed`.
pub struct LocationOutcomeHandler {
    repository: Arc<dyn SessionRepository>,
}

impl LocationOutcomeHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Topics this handler must be subscribed to.
    pub const TOPICS: [&'static str; 4] = [
        topics::LOCATION_CREATED_SUCCESS,
        topics::LOCATION_CREATION_FAILED,
        topics::LOCATION_UPDATE_SUCCESS,
        topics::LOCATION_UPDATE_FAILED,
    ];

    fn outcome_for(topic: &str) -> Option<LocationOutcome> {
        match topic {
            topics::LOCATION_CREATED_SUCCESS => Some(LocationOutcome::CreatedSuccess),
            topics::LOCATION_CREATION_FAILED => Some(LocationOutcome::CreationFailed),
            topics::LOCATION_UPDATE_SUCCESS => Some(LocationOutcome::UpdateSuccess),
            topics::LOCATION_UPDATE_FAILED => Some(LocationOutcome::UpdateFailed),
            _ => None,
        }
    }

    async fn apply(
        &self,
        session_id: SessionId,
        outcome: LocationOutcome,
    ) -> Result<Option<SessionStatus>, DomainError> {
        let Some(session) = self.repository.find_by_id(&session_id).await? else {
            return Ok(None);
        };
        let from = session.status();
        let Some(to) = from.after_location_outcome(outcome) else {
            return Ok(None);
        };
        let applied = self
            .repository
            .transition_status(&session_id, from, to)
            .await?;
        Ok(applied.then_some(to))
    }
}

#[async_trait]
impl EventHandler for LocationOutcomeHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let outcome = Self::outcome_for(&event.event_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Unexpected topic {}", event.event_type),
            )
        })?;
        let payload: OutcomePayload = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed {} payload: {}", event.event_type, e),
            )
        })?;

        if outcome.is_failure() {
            tracing::warn!(
                session_id = %payload.session_id,
                reason = payload.reason.as_deref().unwrap_or("unspecified"),
                topic = %event.event_type,
                "location write failed"
            );
        }

        match self.apply(payload.session_id, outcome).await {
            Ok(Some(status)) => tracing::info!(
                session_id = %payload.session_id,
                status = %status,
                "session status updated from location outcome"
            ),
            Ok(None) => tracing::debug!(
                session_id = %payload.session_id,
                topic = %event.event_type,
                "location outcome ignored, session gone or no longer pending"
            ),
            Err(e) => tracing::error!(
                session_id = %payload.session_id,
                topic = %event.event_type,
                event_id = %event.event_id,
                error = %e,
                "failed to apply location outcome"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LocationOutcomeHandler"
    }
}
