//! Application handlers.
//!
//! Command and query handlers plus event consumers, grouped by the service
//! that owns them. Handlers of one service never call another service's
//! handlers or repositories; they meet only on the event bus.

pub mod location;
pub mod media;
pub mod session;
