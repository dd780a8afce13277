//! Session lifecycle status and its reaction to location outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a training session.
///
/// A session sits in `Pending` from the moment it is created (or relocated)
/// until the location service reports the outcome of the matching write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Pending,
    Upcoming,
    Ongoing,
    Failed,
}

impl SessionStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Failed => "failed",
        }
    }

    /// Status a consumed location outcome moves this session to.
    ///
    /// Only a `Pending` session reacts; any other status makes the outcome a
    /// no-op, which absorbs duplicate and late deliveries.
    pub fn after_location_outcome(&self, outcome: LocationOutcome) -> Option<SessionStatus> {
        match self {
            SessionStatus::Pending => Some(outcome.target_status()),
            _ => None,
        }
    }
}

impl StateMachine for SessionStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use SessionStatus::*;
        match self {
            Pending => &[Pending, Upcoming, Failed],
            Upcoming => &[Pending, Ongoing],
            Ongoing => &[Pending],
            Failed => &[Pending],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Pending => "PENDING",
            SessionStatus::Upcoming => "UPCOMING",
            SessionStatus::Ongoing => "ONGOING",
            SessionStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(SessionStatus::Pending),
            "upcoming" => Ok(SessionStatus::Upcoming),
            "ongoing" => Ok(SessionStatus::Ongoing),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown session status '{}'", other),
            )),
        }
    }
}

/// Outcome of a session-owned location write, as reported by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationOutcome {
    CreatedSuccess,
    CreationFailed,
    UpdateSuccess,
    UpdateFailed,
}

impl LocationOutcome {
    /// `UpdateSuccess` maps to `Upcoming`, same as a first write.
    pub fn target_status(&self) -> SessionStatus {
        match self {
            LocationOutcome::CreatedSuccess | LocationOutcome::UpdateSuccess => {
                SessionStatus::Upcoming
            }
            LocationOutcome::CreationFailed | LocationOutcome::UpdateFailed => {
                SessionStatus::Failed
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LocationOutcome::CreationFailed | LocationOutcome::UpdateFailed
        )
    }
}
