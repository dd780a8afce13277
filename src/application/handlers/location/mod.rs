//! Location service: owner-scoped records, session venue sync and the
//! nearest-session search.

mod find_nearest;
mod location_cascade;
mod session_location_sync;
mod user_location;

pub use find_nearest::{FindNearestSessionsHandler, FindNearestSessionsQuery};
pub use location_cascade::LocationCascadeHandler;
pub use session_location_sync::SessionLocationSyncHandler;
pub use user_location::{
    CreateUserLocationCommand, CreateUserLocationHandler, DeleteUserLocationHandler,
    GetLocationHandler, UpdateUserLocationHandler,
};
