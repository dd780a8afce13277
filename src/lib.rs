//! Yoga Sessions - training sessions with venue tracking and photo moderation
//!
//! Three services share this crate and talk only through the event bus:
//!
//! - **Sessions** schedules training sessions and tracks their status while
//!   the venue is being recorded
//! - **Location** stores owner-scoped geospatial records and answers
//!   nearest-session queries
//! - **Media** stores profile and session photos and runs the moderation
//!   workflow
//!
//! Cross-service consistency is eventual: each service reacts to the others'
//! events and reports outcomes as events of its own.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
