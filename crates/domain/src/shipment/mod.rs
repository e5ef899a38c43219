//! Shipment package aggregate and related types.

mod aggregate;
mod availability;
mod commands;
mod events;
mod service;

pub use aggregate::Package;
pub use availability::{InMemoryProductAvailability, ProductAvailability};
pub use commands::*;
pub use events::{PackageEvent, PackageWasDeliveredData, PackageWasSentData};
pub use service::PackageService;

use thiserror::Error;

use crate::value_objects::{OrderId, ProductId};

/// Errors that can occur during package operations.
#[derive(Debug, Error)]
pub enum PackageError {
    /// A package must contain at least one product item.
    #[error("It's not possible to send package with empty product items")]
    NoProductItems,

    /// Invalid quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// Not enough stock to send the package.
    #[error("Cannot send package for order {order_id}: product was out of stock")]
    OutOfStock { order_id: OrderId },

    /// The package stream already has a sent event.
    #[error("Package already sent")]
    AlreadySent,

    /// The package has not been sent yet.
    #[error("Package has not been sent")]
    NotSent,

    /// The package was already delivered.
    #[error("Package already delivered")]
    AlreadyDelivered,
}
