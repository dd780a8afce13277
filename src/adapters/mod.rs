//! Adapters - Implementations of port interfaces.
//!
//! - `events` - Event bus implementations (in-memory, Redis Streams)
//! - `memory` - In-memory repositories and blob store
//! - `postgres` - PostgreSQL/PostGIS repositories and migrations
//! - `storage` - Filesystem blob store
//! - `auth` - Bearer token validators
//! - `http` - axum routers, DTOs, auth and rate limit middleware
//! - `rate_limiter` - Per-client request quotas (in-memory, Redis)

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod storage;

pub use events::{InMemoryEventBus, RedisEventBus, RedisEventBusConfig};
