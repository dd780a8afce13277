//! Location domain module.
//!
//! Geospatial records keyed by `(owner_id, owner_type)` and the outcome
//! events reported back to the sessions service.

mod aggregate;
mod errors;
mod events;
mod nearest;

pub use aggregate::{Location, LocationChanges, LocationWrite};
pub use errors::LocationError;
pub use events::{
    LocationCreatedSuccess, LocationCreationFailed, LocationUpdateFailed, LocationUpdateSuccess,
    SessionLocationWrite,
};
pub use nearest::{
    NearbyLocation, NearestQuery, DEFAULT_LIMIT, DEFAULT_PAGE, DEFAULT_RADIUS_METERS, MAX_LIMIT,
    MAX_RADIUS_METERS,
};
