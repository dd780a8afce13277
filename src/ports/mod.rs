//! Ports - Interfaces for external dependencies.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Publish an envelope on its topic
//! - `EventSubscriber` - Register handlers per topic
//! - `EventHandler` - Consumer invoked for each delivered envelope
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Sessions service store
//! - `LocationRepository` - Location service store
//! - `PhotoRepository` - Media service store
//! - `ObjectStorage` - Blob store for photo files
//!
//! ## Auth Ports
//!
//! - `SessionValidator` - Bearer token validation
//!
//! ## Traffic Ports
//!
//! - `RateLimiter` - Per-client request quotas

mod event_publisher;
mod event_subscriber;
mod location_repository;
mod object_storage;
mod photo_repository;
mod rate_limiter;
mod session_repository;
mod session_validator;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use location_repository::{LocationRepository, Upserted};
pub use object_storage::{ObjectStorage, StorageError, StoredObject};
pub use photo_repository::{PhotoFileUpdate, PhotoRepository};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
    ThrottleTier,
};
pub use session_repository::{Page, SessionFilter, SessionRepository};
pub use session_validator::SessionValidator;
