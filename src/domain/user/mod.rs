//! User contracts consumed from the users service.

mod events;

pub use events::{UserDeleted, UserEmailUpdated, UserRegistered};
