//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, owner references, the event envelope and the
//! error vocabulary shared by the Sessions, Location and Media services.

mod auth;
mod command;
mod errors;
mod events;
mod geo;
mod ids;
mod owner;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use geo::{GeoPoint, EARTH_RADIUS_METERS};
pub use ids::{LocationId, PhotoId, SessionId, UserId};
pub use owner::{OwnerRef, OwnerType};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
