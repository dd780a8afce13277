//! Training session aggregate.
//!
//! A session is owned by the trainer who scheduled it. Its venue is
//! denormalised here only so the session service can describe the location
//! write it asks for; the authoritative location record lives in the
//! location service.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, GeoPoint, SessionId, StateMachine, Timestamp, UserId,
};

use super::SessionStatus;

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;
pub const MAX_PARTICIPANTS: u32 = 10_000;

/// Where a session takes place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    point: GeoPoint,
    address: String,
    governorate: String,
}

impl Venue {
    /// # Errors
    ///
    /// - `ValidationFailed` for out-of-range coordinates or blank address/governorate
    pub fn new(
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
        governorate: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let point = GeoPoint::new(latitude, longitude)?;
        let address = require_text("address", address.into())?;
        let governorate = require_text("governorate", governorate.into())?;
        Ok(Self {
            point,
            address,
            governorate,
        })
    }

    pub fn point(&self) -> &GeoPoint {
        &self.point
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn governorate(&self) -> &str {
        &self.governorate
    }

    /// Applies a partial change, returning the merged venue.
    fn merged(&self, changes: &VenueChanges) -> Result<Venue, DomainError> {
        let (latitude, longitude) = match (changes.latitude, changes.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            (None, None) => (self.point.latitude(), self.point.longitude()),
            _ => {
                return Err(DomainError::validation(
                    "location",
                    "latitude and longitude must be provided together",
                ))
            }
        };
        Venue::new(
            latitude,
            longitude,
            changes.address.clone().unwrap_or_else(|| self.address.clone()),
            changes
                .governorate
                .clone()
                .unwrap_or_else(|| self.governorate.clone()),
        )
    }
}

/// Partial venue update. Latitude and longitude travel together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueChanges {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub governorate: Option<String>,
}

impl VenueChanges {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.address.is_none()
            && self.governorate.is_none()
    }
}

/// Trainer-supplied session details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub title: String,
    pub description: String,
    pub max_participants: u32,
    pub start_time: Timestamp,
    pub duration_minutes: u32,
    pub price: f64,
    pub notes: Option<String>,
}

impl SessionDetails {
    fn validate(&self, now: Timestamp, current_participants: u32) -> Result<(), DomainError> {
        let title_len = self.title.trim().chars().count();
        if !(MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&title_len) {
            return Err(DomainError::validation(
                "title",
                format!(
                    "Title must be between {} and {} characters",
                    MIN_TITLE_LENGTH, MAX_TITLE_LENGTH
                ),
            ));
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_LENGTH {
            return Err(DomainError::validation(
                "description",
                format!(
                    "Description must be at least {} characters",
                    MIN_DESCRIPTION_LENGTH
                ),
            ));
        }
        if self.max_participants == 0 || self.max_participants > MAX_PARTICIPANTS {
            return Err(DomainError::validation(
                "maxParticipants",
                format!("Between 1 and {} participants must be allowed", MAX_PARTICIPANTS),
            ));
        }
        if self.max_participants < current_participants {
            return Err(DomainError::validation(
                "maxParticipants",
                format!(
                    "Cannot drop below the {} participants already booked",
                    current_participants
                ),
            ));
        }
        if self.duration_minutes == 0 || self.duration_minutes > MAX_DURATION_MINUTES {
            return Err(DomainError::validation(
                "duration",
                format!("Duration must be between 1 and {} minutes", MAX_DURATION_MINUTES),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price", "Price cannot be negative"));
        }
        if !self.start_time.is_after(&now) {
            return Err(DomainError::validation(
                "startTime",
                "Start time must be in the future",
            ));
        }
        Ok(())
    }
}

/// Partial update of a session. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    pub start_time: Option<Timestamp>,
    pub duration_minutes: Option<u32>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub venue: VenueChanges,
}

/// Session aggregate.
///
/// # Invariants
///
/// - `title` is 3-100 characters, `description` at least 10
/// - `current_participants <= max_participants`
/// - status moves only along `SessionStatus` edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    id: SessionId,
    trainer_id: UserId,
    details: SessionDetails,
    current_participants: u32,
    venue: Venue,
    status: SessionStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TrainingSession {
    /// Schedules a new session in `Pending` status.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if any detail breaks the invariants or the start
    ///   time is not after `now`
    pub fn schedule(
        id: SessionId,
        trainer_id: UserId,
        details: SessionDetails,
        venue: Venue,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let details = SessionDetails {
            title: details.title.trim().to_string(),
            ..details
        };
        details.validate(now, 0)?;

        Ok(Self {
            id,
            trainer_id,
            details,
            current_participants: 0,
            venue,
            status: SessionStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        trainer_id: UserId,
        details: SessionDetails,
        current_participants: u32,
        venue: Venue,
        status: SessionStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            trainer_id,
            details,
            current_participants,
            venue,
            status,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn trainer_id(&self) -> &UserId {
        &self.trainer_id
    }

    pub fn details(&self) -> &SessionDetails {
        &self.details
    }

    pub fn current_participants(&self) -> u32 {
        self.current_participants
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user is the trainer of this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.trainer_id == user_id
    }

    /// # Errors
    ///
    /// - `Forbidden` if user is not the trainer
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the trainer of this session can modify it",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a partial update.
    ///
    /// Returns `true` when the venue was part of the update. In that case the
    /// session goes back to `Pending` until the location outcome arrives.
    /// Nothing is modified if validation fails.
    pub fn apply_changes(
        &mut self,
        changes: SessionChanges,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let relocated = !changes.venue.is_empty();
        let venue = if relocated {
            Some(self.venue.merged(&changes.venue)?)
        } else {
            None
        };
        let status = if relocated {
            transition(self.status, SessionStatus::Pending)?
        } else {
            self.status
        };

        let current = &self.details;
        let details = SessionDetails {
            title: changes
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| current.title.clone()),
            description: changes
                .description
                .unwrap_or_else(|| current.description.clone()),
            max_participants: changes.max_participants.unwrap_or(current.max_participants),
            start_time: changes.start_time.unwrap_or(current.start_time),
            duration_minutes: changes.duration_minutes.unwrap_or(current.duration_minutes),
            price: changes.price.unwrap_or(current.price),
            notes: changes.notes.or_else(|| current.notes.clone()),
        };

        if changes.start_time.is_some() {
            details.validate(now, self.current_participants)?;
        } else {
            // An unchanged start time may already be in the past.
            details.validate(
                details.start_time.minus_minutes(1),
                self.current_participants,
            )?;
        }

        self.details = details;
        if let Some(venue) = venue {
            self.venue = venue;
        }
        self.status = status;
        self.updated_at = now;
        Ok(relocated)
    }

    /// Records a status change decided elsewhere (location outcome).
    pub fn set_status(&mut self, status: SessionStatus) -> Result<(), DomainError> {
        self.status = transition(self.status, status)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

fn transition(from: SessionStatus, to: SessionStatus) -> Result<SessionStatus, DomainError> {
    from.transition_to(to)
        .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))
}

fn require_text(field: &str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::validation(
            field,
            format!("Field '{}' cannot be empty", field),
        ))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(now: Timestamp) -> SessionDetails {
        SessionDetails {
            title: "Sunrise Vinyasa".to_string(),
            description: "Gentle flow on the rooftop".to_string(),
            max_participants: 12,
            start_time: now.plus_minutes(24 * 60),
            duration_minutes: 60,
            price: 150.0,
            notes: None,
        }
    }

    fn venue() -> Venue {
        Venue::new(30.04, 31.23, "12 Nile St", "Cairo").unwrap()
    }

    fn scheduled() -> (TrainingSession, UserId, Timestamp) {
        let now = Timestamp::now();
        let trainer = UserId::new();
        let session =
            TrainingSession::schedule(SessionId::new(), trainer, details(now), venue(), now)
                .unwrap();
        (session, trainer, now)
    }

    #[test]
    fn schedule_starts_pending_with_no_participants() {
        let (session, trainer, _) = scheduled();
        assert_eq!(session.status(), SessionStatus::Pending);
        assert_eq!(session.current_participants(), 0);
        assert!(session.is_owner(&trainer));
    }

    #[test]
    fn schedule_rejects_short_title() {
        let now = Timestamp::now();
        let mut d = details(now);
        d.title = "  ab ".to_string();
        let err = TrainingSession::schedule(SessionId::new(), UserId::new(), d, venue(), now)
            .unwrap_err();
        assert_eq!(err.details.get("field"), Some(&"title".to_string()));
    }

    #[test]
    fn schedule_rejects_past_start_time() {
        let now = Timestamp::now();
        let mut d = details(now);
        d.start_time = now.minus_minutes(5);
        let err = TrainingSession::schedule(SessionId::new(), UserId::new(), d, venue(), now)
            .unwrap_err();
        assert_eq!(err.details.get("field"), Some(&"startTime".to_string()));
    }

    #[test]
    fn schedule_rejects_negative_price() {
        let now = Timestamp::now();
        let mut d = details(now);
        d.price = -1.0;
        let result = TrainingSession::schedule(SessionId::new(), UserId::new(), d, venue(), now);
        assert!(result.is_err());
    }

    #[test]
    fn schedule_bounds_max_participants() {
        let now = Timestamp::now();
        let mut d = details(now);
        d.max_participants = MAX_PARTICIPANTS;
        assert!(
            TrainingSession::schedule(SessionId::new(), UserId::new(), d.clone(), venue(), now)
                .is_ok()
        );

        d.max_participants = u32::MAX;
        let err = TrainingSession::schedule(SessionId::new(), UserId::new(), d, venue(), now)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(
            err.details.get("field"),
            Some(&"maxParticipants".to_string())
        );
    }

    #[test]
    fn venue_rejects_blank_address() {
        let err = Venue::new(30.0, 31.0, "   ", "Cairo").unwrap_err();
        assert_eq!(err.details.get("field"), Some(&"address".to_string()));
    }

    #[test]
    fn authorize_rejects_other_users() {
        let (session, trainer, _) = scheduled();
        assert!(session.authorize(&trainer).is_ok());
        let err = session.authorize(&UserId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn field_update_keeps_status() {
        let (mut session, _, now) = scheduled();
        session.set_status(SessionStatus::Upcoming).unwrap();

        let relocated = session
            .apply_changes(
                SessionChanges {
                    title: Some("Sunset Vinyasa".to_string()),
                    ..Default::default()
                },
                now,
            )
            .unwrap();

        assert!(!relocated);
        assert_eq!(session.status(), SessionStatus::Upcoming);
        assert_eq!(session.details().title, "Sunset Vinyasa");
    }

    #[test]
    fn venue_update_resets_to_pending_and_merges() {
        let (mut session, _, now) = scheduled();
        session.set_status(SessionStatus::Upcoming).unwrap();

        let relocated = session
            .apply_changes(
                SessionChanges {
                    venue: VenueChanges {
                        address: Some("5 Tahrir Sq".to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                now,
            )
            .unwrap();

        assert!(relocated);
        assert_eq!(session.status(), SessionStatus::Pending);
        assert_eq!(session.venue().address(), "5 Tahrir Sq");
        assert_eq!(session.venue().governorate(), "Cairo");
        assert_eq!(session.venue().point().latitude(), 30.04);
    }

    #[test]
    fn venue_update_requires_coordinate_pair() {
        let (mut session, _, now) = scheduled();
        let before = session.clone();

        let err = session
            .apply_changes(
                SessionChanges {
                    venue: VenueChanges {
                        latitude: Some(29.9),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                now,
            )
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(session, before);
    }

    #[test]
    fn failed_session_can_be_relocated() {
        let (mut session, _, now) = scheduled();
        session.set_status(SessionStatus::Failed).unwrap();

        session
            .apply_changes(
                SessionChanges {
                    venue: VenueChanges {
                        latitude: Some(31.2),
                        longitude: Some(29.9),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                now,
            )
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn set_status_rejects_invalid_edge() {
        let (mut session, _, _) = scheduled();
        session.set_status(SessionStatus::Failed).unwrap();
        let err = session.set_status(SessionStatus::Upcoming).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }
}
