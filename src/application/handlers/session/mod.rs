//! Sessions service: command/query handlers and event consumers.

mod create_session;
mod delete_session;
mod get_session;
mod location_outcome;
mod trainer_deleted;
mod update_session;

pub use create_session::{CreateSessionCommand, CreateSessionHandler};
pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use get_session::{GetSessionHandler, ListSessionsHandler, ListSessionsQuery};
pub use location_outcome::LocationOutcomeHandler;
pub use trainer_deleted::TrainerDeletedHandler;
pub use update_session::{UpdateSessionCommand, UpdateSessionHandler};
