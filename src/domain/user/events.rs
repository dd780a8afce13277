//! Contracts published by the users service.
//!
//! Only `UserDeleted` is consumed here; the other two are kept so producers
//! and consumers across the platform agree on one wire shape.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, Timestamp, UserId};
use crate::domain::topics;

/// A user account was removed. Every service drops what the user owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDeleted {
    #[serde(skip)]
    pub event_id: EventId,
    pub user_id: UserId,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

impl UserDeleted {
    pub fn new(user_id: UserId) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    UserDeleted,
    event_type = topics::USER_DELETED,
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = occurred_at,
    event_id = event_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmailUpdated {
    #[serde(skip)]
    pub event_id: EventId,
    pub user_id: UserId,
    pub email: String,
    #[serde(skip)]
    pub occurred_at: Timestamp,
}

domain_event!(
    UserEmailUpdated,
    event_type = topics::USER_EMAIL_UPDATED,
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = occurred_at,
    event_id = event_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistered {
    #[serde(skip)]
    pub event_id: EventId,
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: Timestamp,
}

domain_event!(
    UserRegistered,
    event_type = topics::USER_REGISTERED,
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = created_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;
    use serde_json::json;

    #[test]
    fn user_deleted_payload_is_just_the_id() {
        let user_id = UserId::new();
        let envelope = UserDeleted::new(user_id).to_envelope();
        assert_eq!(envelope.event_type, "user.deleted");
        assert_eq!(envelope.payload, json!({ "userId": user_id.to_string() }));
    }

    #[test]
    fn user_registered_keeps_created_at_on_the_wire() {
        let user_id = UserId::new();
        let payload = json!({
            "userId": user_id.to_string(),
            "email": "amira@example.com",
            "name": "Amira",
            "createdAt": "2025-03-01T09:00:00Z",
        });

        let event: UserRegistered = serde_json::from_value(payload).unwrap();
        let envelope = event.to_envelope();

        assert_eq!(envelope.event_type, "user.registered");
        assert_eq!(envelope.payload["createdAt"], "2025-03-01T09:00:00Z");
    }

    #[test]
    fn user_email_updated_decodes() {
        let user_id = UserId::new();
        let event: UserEmailUpdated = serde_json::from_value(json!({
            "userId": user_id.to_string(),
            "email": "new@example.com",
        }))
        .unwrap();
        assert_eq!(event.email, "new@example.com");
        assert_eq!(event.to_envelope().event_type, "user.email.updated");
    }
}
