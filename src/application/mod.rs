//! Application layer - Commands, Queries, Handlers and event consumers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers publish through `EventPublisher`; consumers are
//! `EventHandler`s registered on the bus by `Consumers::register`.

pub mod consumers;
pub mod handlers;

pub use consumers::Consumers;
