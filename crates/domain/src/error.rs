//! Domain error types.

use common::StreamId;
use event_store::EventStoreError;
use thiserror::Error;

use crate::aggregator::ReplayError;
use crate::product::ProductError;
use crate::shipment::PackageError;
use crate::shopping_cart::CartError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The stored stream could not be replayed.
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {stream_id}")]
    NotFound {
        aggregate_type: &'static str,
        stream_id: StreamId,
    },

    /// An error occurred in the user aggregate.
    #[error("User error: {0}")]
    User(UserError),

    /// An error occurred in the shopping cart aggregate.
    #[error("Shopping cart error: {0}")]
    Cart(CartError),

    /// An error occurred in the package aggregate.
    #[error("Package error: {0}")]
    Package(PackageError),

    /// An error occurred in the product aggregate.
    #[error("Product error: {0}")]
    Product(ProductError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// True when reloading and re-running the command may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::EventStore(e) if e.is_concurrency_conflict())
    }

    /// True for the store's optimistic concurrency conflict.
    pub fn is_concurrency_conflict(&self) -> bool {
        self.is_retryable()
    }
}
