//! Shopping cart service providing a simplified API for cart operations.

use common::StreamId;
use event_store::{EventContext, EventStore};
use publisher::PublisherBridge;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    AddProduct, CancelShoppingCart, CartError, ConfirmShoppingCart, OpenShoppingCart,
    RemoveProduct, ShoppingCart,
};

impl From<CartError> for DomainError {
    fn from(e: CartError) -> Self {
        DomainError::Cart(e)
    }
}

/// Service for managing shopping carts.
///
/// Commands that add or remove products retry on concurrency conflicts,
/// since the client's intent doesn't depend on the exact cart version.
pub struct ShoppingCartService<S: EventStore> {
    handler: CommandHandler<S, ShoppingCart>,
    max_attempts: u32,
}

impl<S: EventStore> ShoppingCartService<S> {
    /// Creates a new shopping cart service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
            max_attempts: 3,
        }
    }

    /// Publishes committed cart events through `publisher`.
    pub fn with_publisher(self, publisher: PublisherBridge) -> Self {
        Self {
            handler: self.handler.with_publisher(publisher),
            ..self
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, ShoppingCart> {
        &self.handler
    }

    /// Opens a new cart.
    #[tracing::instrument(skip(self, context))]
    pub async fn open_cart(
        &self,
        cmd: OpenShoppingCart,
        context: EventContext,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        let cart_id = cmd.stream_id();
        let client_id = cmd.client_id;

        self.handler
            .execute(cart_id, context, |cart| cart.open(cart_id, client_id))
            .await
    }

    /// Adds a product to a cart.
    #[tracing::instrument(skip(self, context))]
    pub async fn add_product(
        &self,
        cmd: AddProduct,
        context: EventContext,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        let product_item = cmd.product_item;

        self.handler
            .execute_with_retry(cmd.stream_id(), context, self.max_attempts, |cart| {
                cart.add_product(product_item)
            })
            .await
    }

    /// Removes a product from a cart.
    #[tracing::instrument(skip(self, context))]
    pub async fn remove_product(
        &self,
        cmd: RemoveProduct,
        context: EventContext,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        let product_item = cmd.product_item;

        self.handler
            .execute_with_retry(cmd.stream_id(), context, self.max_attempts, |cart| {
                cart.remove_product(product_item)
            })
            .await
    }

    /// Confirms a cart.
    #[tracing::instrument(skip(self, context))]
    pub async fn confirm_cart(
        &self,
        cmd: ConfirmShoppingCart,
        context: EventContext,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        match cmd.expected_version {
            Some(expected) => {
                self.handler
                    .execute_at(cmd.stream_id(), expected, context, |cart| cart.confirm())
                    .await
            }
            None => {
                self.handler
                    .execute(cmd.stream_id(), context, |cart| cart.confirm())
                    .await
            }
        }
    }

    /// Cancels a cart.
    #[tracing::instrument(skip(self, context))]
    pub async fn cancel_cart(
        &self,
        cmd: CancelShoppingCart,
        context: EventContext,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        self.handler
            .execute(cmd.stream_id(), context, |cart| cart.cancel())
            .await
    }

    /// Loads a cart by ID, failing with `NotFound` if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: StreamId) -> Result<ShoppingCart, DomainError> {
        self.handler.get(cart_id).await
    }
}
