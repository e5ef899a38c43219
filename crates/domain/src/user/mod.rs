//! User aggregate: the stream aggregation workshop.
//!
//! A user is created with a name and can be renamed. Replaying
//! `UserCreated("John Doe")` then `UserNameUpdated("Adam Smith")` yields a
//! user named "Adam Smith" at version 2.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::User;
pub use commands::*;
pub use events::{UserCreatedData, UserEvent, UserNameUpdatedData};
pub use service::UserService;

use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// User names must contain non-whitespace characters.
    #[error("User name is required")]
    NameRequired,

    /// The user stream already has a creation event.
    #[error("User already created")]
    AlreadyCreated,

    /// The user has not been created yet.
    #[error("User has not been created")]
    NotCreated,
}
