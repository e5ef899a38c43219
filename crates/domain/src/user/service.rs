//! User service providing a simplified API for user operations.

use common::StreamId;
use event_store::{EventContext, EventStore};
use publisher::PublisherBridge;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{CreateUser, UpdateUserName, User, UserError};

impl From<UserError> for DomainError {
    fn from(e: UserError) -> Self {
        DomainError::User(e)
    }
}

/// Service for managing users.
pub struct UserService<S: EventStore> {
    handler: CommandHandler<S, User>,
}

impl<S: EventStore> UserService<S> {
    /// Creates a new user service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Publishes committed user events through `publisher`.
    pub fn with_publisher(self, publisher: PublisherBridge) -> Self {
        Self {
            handler: self.handler.with_publisher(publisher),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, User> {
        &self.handler
    }

    /// Creates a new user.
    #[tracing::instrument(skip(self, context))]
    pub async fn create_user(
        &self,
        cmd: CreateUser,
        context: EventContext,
    ) -> Result<CommandResult<User>, DomainError> {
        let user_id = cmd.stream_id();

        self.handler
            .execute(user_id, context, |user| user.create(user_id, &cmd.name))
            .await
    }

    /// Renames an existing user.
    #[tracing::instrument(skip(self, context))]
    pub async fn update_user_name(
        &self,
        cmd: UpdateUserName,
        context: EventContext,
    ) -> Result<CommandResult<User>, DomainError> {
        self.handler
            .execute(cmd.stream_id(), context, |user| user.update_name(&cmd.name))
            .await
    }

    /// Loads a user by ID.
    ///
    /// Returns None if the user doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, user_id: StreamId) -> Result<Option<User>, DomainError> {
        self.handler.load_existing(user_id).await
    }
}
