//! Session domain module.
//!
//! Training sessions scheduled by trainers, and the status each one carries
//! while its venue is being recorded by the location service.
//!
//! # Events
//!
//! - `SessionCreated` - venue write requested for a new session
//! - `SessionUpdated` - venue write requested for a relocated session
//! - `SessionDeleted` - dependent location and photos must go

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::{
    SessionChanges, SessionDetails, TrainingSession, Venue, VenueChanges, MAX_DURATION_MINUTES,
    MAX_PARTICIPANTS, MAX_TITLE_LENGTH, MIN_DESCRIPTION_LENGTH, MIN_TITLE_LENGTH,
};
pub use errors::SessionError;
pub use events::{SessionCreated, SessionDeleted, SessionUpdated};
pub use status::{LocationOutcome, SessionStatus};
