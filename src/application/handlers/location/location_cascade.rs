//! LocationCascadeHandler - drops locations whose owner is gone.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, OwnerRef};
use crate::domain::session::SessionDeleted;
use crate::domain::topics;
use crate::domain::user::UserDeleted;
use crate::ports::{EventHandler, LocationRepository};

/// Consumer for `session.deleted` and `user.deleted`.
///
/// Best effort: store errors are logged, nothing is published back.
pub struct LocationCascadeHandler {
    repository: Arc<dyn LocationRepository>,
}

impl LocationCascadeHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
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
            topics::SESSION_DELETED => {
                let payload: SessionDeleted = event.payload_as().map_err(malformed)?;
                Ok(OwnerRef::session(payload.session_id))
            }
            topics::USER_DELETED => {
                let payload: UserDeleted = event.payload_as().map_err(malformed)?;
                Ok(OwnerRef::user(payload.user_id))
            }
            other => Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Unexpected topic {}", other),
            )),
        }
    }
}

#[async_trait]
impl EventHandler for LocationCascadeHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let owner = Self::owner_of(&event)?;

        match self.repository.delete_by_owner(&owner).await {
            Ok(true) => tracing::info!(owner = %owner, "location removed with its owner"),
            Ok(false) => tracing::debug!(owner = %owner, "no location stored for deleted owner"),
            Err(e) => tracing::error!(
                owner = %owner,
                event_id = %event.event_id,
                error = %e,
                "failed to remove location of deleted owner"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LocationCascadeHandler"
    }
}
