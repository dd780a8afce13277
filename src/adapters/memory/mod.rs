//! In-memory adapters for the persistence and storage ports.
//!
//! Used by the single-process dev profile and by tests. Nothing survives a
//! restart.

mod location_repository;
mod object_storage;
mod photo_repository;
mod session_repository;

pub use location_repository::InMemoryLocationRepository;
pub use object_storage::InMemoryObjectStorage;
pub use photo_repository::InMemoryPhotoRepository;
pub use session_repository::InMemorySessionRepository;
