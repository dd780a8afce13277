//! Blob storage adapters.
//!
//! - **LocalObjectStorage** - Photo files on the local filesystem

mod local_object_storage;

pub use local_object_storage::LocalObjectStorage;
