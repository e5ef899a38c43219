//! Warehouse product catalogue.

mod aggregate;
mod commands;
mod events;
mod service;
mod sku;
mod sku_index;

pub use aggregate::Product;
pub use commands::RegisterProduct;
pub use events::{ProductEvent, ProductRegisteredData};
pub use service::ProductService;
pub use sku::Sku;
pub use sku_index::{InMemorySkuIndex, SkuIndex};

use thiserror::Error;

use crate::value_objects::ProductId;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Product id was missing or nil.
    #[error("Product id must be a non-empty UUID")]
    InvalidId,

    /// SKU does not have the expected shape.
    #[error("Invalid SKU {sku:?}: expected 2-4 uppercase letters followed by 4-18 digits")]
    InvalidSku { sku: String },

    /// Product name is required.
    #[error("Product name is required")]
    NameRequired,

    /// Description, when given, must not be empty.
    #[error("Product description must not be empty when provided")]
    EmptyDescription,

    /// Another product already uses the SKU.
    #[error("Product with SKU {sku} already exists as {existing}")]
    DuplicateSku { sku: Sku, existing: ProductId },

    /// The product stream already exists.
    #[error("Product already registered")]
    AlreadyRegistered,
}
