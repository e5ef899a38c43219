//! Append-only event store for event-sourced aggregates.
//!
//! This crate provides:
//! - [`EventEnvelope`] and [`EventMetadata`], the stored form of an event
//! - [`EventStore`], the append-with-expected-version / read contract
//! - [`InMemoryEventStore`] for tests and local runs
//! - [`PostgresEventStore`] backed by `sqlx`

pub mod envelope;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::StreamId;
pub use envelope::{
    CausationId, CorrelationId, EventContext, EventEnvelope, EventId, EventMetadata,
    GlobalPosition, NewEvent, Version,
};
pub use error::{EventStoreError, Result};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{AppendResult, EventStore, EventStoreExt, EventStream};
