//! Shopping cart aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod status;

pub use aggregate::ShoppingCart;
pub use commands::*;
pub use events::{
    ProductAddedData, ProductRemovedData, ShoppingCartCanceledData, ShoppingCartConfirmedData,
    ShoppingCartEvent, ShoppingCartOpenedData,
};
pub use service::ShoppingCartService;
pub use status::ShoppingCartStatus;

use thiserror::Error;

use crate::value_objects::{Money, ProductId};

/// Errors that can occur during shopping cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart stream already has an opening event.
    #[error("Shopping cart already opened")]
    AlreadyOpened,

    /// The cart has not been opened yet.
    #[error("Shopping cart has not been opened")]
    NotOpened,

    /// Only pending carts can change.
    #[error("Cannot {action} a {status} shopping cart")]
    NotPending {
        status: ShoppingCartStatus,
        action: &'static str,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: Money },

    /// The line quantity or the cart total would no longer fit.
    #[error("Adding {quantity} of product {product_id} exceeds the cart's quantity or amount limit")]
    LimitExceeded {
        product_id: ProductId,
        quantity: u32,
    },

    /// Tried to remove more units than the cart holds.
    #[error("Not enough of product {product_id}: requested {requested}, cart holds {available}")]
    NotEnoughProduct {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
}
