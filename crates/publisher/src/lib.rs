//! Outbound side of the event store.
//!
//! Once the store confirms an append, the committed envelopes are handed to
//! a [`MessageBus`] through the [`PublisherBridge`]:
//! - [`MessageBus`] trait with in-memory and broadcast implementations
//! - [`RetryPolicy`] bounding each delivery with a timeout and backoff
//! - [`Reconciler`] re-publishing everything after a checkpoint, so a failed
//!   publish is eventually delivered

pub mod bridge;
pub mod bus;
pub mod error;
pub mod reconcile;
pub mod retry;

pub use bridge::PublisherBridge;
pub use bus::{BroadcastMessageBus, InMemoryMessageBus, MessageBus};
pub use error::{BusError, PublishError, Result};
pub use reconcile::{Reconciler, SweepReport};
pub use retry::RetryPolicy;
