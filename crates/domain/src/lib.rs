//! Domain layer for the event-sourcing system.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - The aggregator that rebuilds aggregates from stored envelopes
//! - Command trait and CommandHandler for command processing
//! - Sample modules: users, shopping carts, shipments and products

pub mod aggregate;
pub mod aggregator;
pub mod command;
pub mod error;
pub mod product;
pub mod shipment;
pub mod shopping_cart;
pub mod user;
pub mod value_objects;

pub use aggregate::{Aggregate, DomainEvent};
pub use aggregator::{ReplayError, aggregate_stream};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use product::{
    InMemorySkuIndex, Product, ProductError, ProductEvent, ProductService, RegisterProduct, Sku,
    SkuIndex,
};
pub use shipment::{
    DeliverPackage, InMemoryProductAvailability, Package, PackageError, PackageEvent,
    PackageService, ProductAvailability, SendPackage,
};
pub use shopping_cart::{
    AddProduct, CancelShoppingCart, CartError, ConfirmShoppingCart, OpenShoppingCart,
    RemoveProduct, ShoppingCart, ShoppingCartEvent, ShoppingCartService, ShoppingCartStatus,
};
pub use user::{CreateUser, UpdateUserName, User, UserError, UserEvent, UserService};
pub use value_objects::{ClientId, Money, OrderId, PricedProductItem, ProductId, ProductItem};
