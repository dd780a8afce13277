//! HTTP adapters - REST API implementations.
//!
//! Each service has its own HTTP adapter; `build_router` merges them behind
//! the auth middleware.

pub mod error;
pub mod location;
pub mod media;
pub mod middleware;
pub mod router;
pub mod session;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, RouterOptions};
pub use state::{ApiDependencies, ApiState};
