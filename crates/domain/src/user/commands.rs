//! User commands.

use common::StreamId;

use crate::command::Command;

use super::User;

/// Command to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub user_id: StreamId,
    pub name: String,
}

impl CreateUser {
    /// Creates a new CreateUser command.
    pub fn new(user_id: StreamId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }

    /// Creates a new CreateUser command with a generated user ID.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(StreamId::new(), name)
    }
}

impl Command for CreateUser {
    type Aggregate = User;

    fn stream_id(&self) -> StreamId {
        self.user_id
    }
}

/// Command to rename a user.
#[derive(Debug, Clone)]
pub struct UpdateUserName {
    pub user_id: StreamId,
    pub name: String,
}

impl UpdateUserName {
    /// Creates a new UpdateUserName command.
    pub fn new(user_id: StreamId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

impl Command for UpdateUserName {
    type Aggregate = User;

    fn stream_id(&self) -> StreamId {
        self.user_id
    }
}
