//! SessionLocationSyncHandler - records session venues and reports back.
//!
//! Consumes `session.created` and `session.updated`, upserts the
//! `(sessionId, SESSION)` record and answers with the matching
//! `location.*` success or failure event. Failures never escape the
//! handler: the sessions service learns about them through the failure
//! topic only.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, OwnerRef, SessionId};
use crate::domain::location::{LocationWrite, SessionLocationWrite};
use crate::domain::topics;
use crate::ports::{EventHandler, EventPublisher, LocationRepository};

/// Venue fields of `session.created` / `session.updated`.
///
/// Everything but the session id is optional here so an incomplete payload
/// still produces a failure event instead of leaving the session pending.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VenuePayload {
    session_id: SessionId,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
    governorate: Option<String>,
}

impl VenuePayload {
    fn into_write(self) -> Result<LocationWrite, DomainError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(DomainError::validation(
                "location",
                "latitude and longitude are required",
            ));
        };
        LocationWrite::new(
            latitude,
            longitude,
            self.address.unwrap_or_default(),
            self.governorate.unwrap_or_default(),
        )
    }
}

pub struct SessionLocationSyncHandler {
    repository: Arc<dyn LocationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SessionLocationSyncHandler {
    pub fn new(
        repository: Arc<dyn LocationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    /// Topics this handler must be subscribed to.
    pub const TOPICS: [&'static str; 2] = [topics::SESSION_CREATED, topics::SESSION_UPDATED];

    async fn record(
        &self,
        session_id: SessionId,
        payload: VenuePayload,
    ) -> Result<(), DomainError> {
        let write = payload.into_write()?;
        self.repository
            .upsert(&OwnerRef::session(session_id), write)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for SessionLocationSyncHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let kind = match event.event_type.as_str() {
            topics::SESSION_CREATED => SessionLocationWrite::Create,
            topics::SESSION_UPDATED => SessionLocationWrite::Update,
            other => {
                return Err(DomainError::new(
                    ErrorCode::InternalError,
                    format!("Unexpected topic {}", other),
                ))
            }
        };
        let payload: VenuePayload = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed {} payload: {}", event.event_type, e),
            )
        })?;
        let session_id = payload.session_id;

        let outcome = match self.record(session_id, payload).await {
            Ok(()) => {
                tracing::info!(
                    session_id = %session_id,
                    topic = %event.event_type,
                    "session location recorded"
                );
                kind.success(session_id)
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    topic = %event.event_type,
                    error = %e,
                    "session location write failed"
                );
                kind.failure(session_id, e.message)
            }
        };

        let outcome_topic = outcome.event_type.clone();
        if let Err(e) = self.event_publisher.publish(outcome.caused_by(&event)).await {
            tracing::error!(
                session_id = %session_id,
                topic = %outcome_topic,
                event_id = %event.event_id,
                error = %e,
                "failed to publish location outcome"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SessionLocationSyncHandler"
    }
}
