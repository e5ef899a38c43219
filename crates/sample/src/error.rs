//! Sample binary error type.

use domain::{DomainError, ProductError};
use event_store::EventStoreError;
use thiserror::Error;

/// Errors that abort the sample run.
#[derive(Debug, Error)]
pub enum SampleError {
    /// A command was rejected or could not be persisted.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The store could not be opened or migrated.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Product input failed validation.
    #[error("Invalid product: {0}")]
    Product(#[from] ProductError),

    /// A global tracing subscriber was already installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, SampleError>;
