//! Shopping cart commands.

use common::StreamId;
use event_store::Version;

use crate::command::Command;
use crate::value_objects::{ClientId, PricedProductItem};

use super::ShoppingCart;

/// Command to open a new shopping cart.
#[derive(Debug, Clone)]
pub struct OpenShoppingCart {
    pub cart_id: StreamId,
    pub client_id: ClientId,
}

impl OpenShoppingCart {
    /// Creates a new OpenShoppingCart command.
    pub fn new(cart_id: StreamId, client_id: ClientId) -> Self {
        Self { cart_id, client_id }
    }

    /// Creates a new OpenShoppingCart command with a generated cart ID.
    pub fn for_client(client_id: ClientId) -> Self {
        Self::new(StreamId::new(), client_id)
    }
}

impl Command for OpenShoppingCart {
    type Aggregate = ShoppingCart;

    fn stream_id(&self) -> StreamId {
        self.cart_id
    }
}

/// Command to add a product to a cart.
#[derive(Debug, Clone)]
pub struct AddProduct {
    pub cart_id: StreamId,
    pub product_item: PricedProductItem,
}

impl AddProduct {
    /// Creates a new AddProduct command.
    pub fn new(cart_id: StreamId, product_item: PricedProductItem) -> Self {
        Self {
            cart_id,
            product_item,
        }
    }
}

impl Command for AddProduct {
    type Aggregate = ShoppingCart;

    fn stream_id(&self) -> StreamId {
        self.cart_id
    }
}

/// Command to remove a product from a cart.
#[derive(Debug, Clone)]
pub struct RemoveProduct {
    pub cart_id: StreamId,
    pub product_item: PricedProductItem,
}

impl RemoveProduct {
    /// Creates a new RemoveProduct command.
    pub fn new(cart_id: StreamId, product_item: PricedProductItem) -> Self {
        Self {
            cart_id,
            product_item,
        }
    }
}

impl Command for RemoveProduct {
    type Aggregate = ShoppingCart;

    fn stream_id(&self) -> StreamId {
        self.cart_id
    }
}

/// Command to confirm a cart.
///
/// When `expected_version` is set the cart is only confirmed if nothing
/// changed since the client read it.
#[derive(Debug, Clone)]
pub struct ConfirmShoppingCart {
    pub cart_id: StreamId,
    pub expected_version: Option<Version>,
}

impl ConfirmShoppingCart {
    /// Creates a new ConfirmShoppingCart command.
    pub fn new(cart_id: StreamId) -> Self {
        Self {
            cart_id,
            expected_version: None,
        }
    }

    /// Creates a ConfirmShoppingCart command checked against a known version.
    pub fn at_version(cart_id: StreamId, expected_version: Version) -> Self {
        Self {
            cart_id,
            expected_version: Some(expected_version),
        }
    }
}

impl Command for ConfirmShoppingCart {
    type Aggregate = ShoppingCart;

    fn stream_id(&self) -> StreamId {
        self.cart_id
    }
}

/// Command to cancel a cart.
#[derive(Debug, Clone)]
pub struct CancelShoppingCart {
    pub cart_id: StreamId,
}

impl CancelShoppingCart {
    /// Creates a new CancelShoppingCart command.
    pub fn new(cart_id: StreamId) -> Self {
        Self { cart_id }
    }
}

impl Command for CancelShoppingCart {
    type Aggregate = ShoppingCart;

    fn stream_id(&self) -> StreamId {
        self.cart_id
    }
}
