//! HTTP adapter for location endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateLocationRequest, LocationResponse, NearbySessionResponse, NearestParams,
    NearestSessionsResponse, UpdateLocationRequest,
};
pub use handlers::LocationHandlers;
pub use routes::location_routes;
