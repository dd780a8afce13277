//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, event envelope)
//! - `topics` - Event bus topic names
//! - `session` - Training sessions and their location-gated status
//! - `location` - Owner-scoped geospatial records and outcome events
//! - `media` - User and session photos with the moderation workflow
//! - `user` - Contracts published by the users service

pub mod foundation;
pub mod location;
pub mod media;
pub mod session;
pub mod topics;
pub mod user;
