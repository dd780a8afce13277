//! Owner references for records scoped to another aggregate.
//!
//! Locations and photos are keyed by `(owner_id, owner_type)`; the owner is
//! either a user or a session living in a different service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{SessionId, UserId, ValidationError};

/// Kind of aggregate that owns a location or photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    User,
    Session,
}

impl OwnerType {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::User => "user",
            OwnerType::Session => "session",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerType::User => write!(f, "USER"),
            OwnerType::Session => write!(f, "SESSION"),
        }
    }
}

impl FromStr for OwnerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(OwnerType::User),
            "session" => Ok(OwnerType::Session),
            other => Err(ValidationError::invalid_format(
                "owner_type",
                format!("unknown owner type '{}'", other),
            )),
        }
    }
}

/// Composite key `(owner_id, owner_type)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub owner_id: Uuid,
    pub owner_type: OwnerType,
}

impl OwnerRef {
    pub fn new(owner_id: Uuid, owner_type: OwnerType) -> Self {
        Self {
            owner_id,
            owner_type,
        }
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(*user_id.as_uuid(), OwnerType::User)
    }

    pub fn session(session_id: SessionId) -> Self {
        Self::new(*session_id.as_uuid(), OwnerType::Session)
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner_type, self.owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_type_parses_case_insensitively() {
        assert_eq!("USER".parse::<OwnerType>().unwrap(), OwnerType::User);
        assert_eq!("session".parse::<OwnerType>().unwrap(), OwnerType::Session);
        assert!("trainer".parse::<OwnerType>().is_err());
    }

    #[test]
    fn owner_type_serializes_screaming_case() {
        let json = serde_json::to_string(&OwnerType::Session).unwrap();
        assert_eq!(json, "\"SESSION\"");
    }

    #[test]
    fn session_and_user_refs_with_same_uuid_differ() {
        let uuid = Uuid::new_v4();
        let as_session = OwnerRef::session(SessionId::from_uuid(uuid));
        let as_user = OwnerRef::user(UserId::from_uuid(uuid));
        assert_ne!(as_session, as_user);
        assert_eq!(as_session.owner_id, as_user.owner_id);
    }
}
