use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{
    EventEnvelope, EventStoreError, GlobalPosition, NewEvent, Result, StreamId, Version,
};

/// Outcome of a successful append.
#[derive(Debug, Clone)]
pub struct AppendResult {
    /// The stream version after the append (the version of the last event).
    pub version: Version,

    /// The envelopes that were committed, in stream order.
    pub envelopes: Vec<EventEnvelope>,
}

/// A stream of envelopes in global position order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Core trait for event store implementations.
///
/// An event store keeps one append-only stream per aggregate. All writers
/// go through [`EventStore::append`], whose version check is the only
/// concurrency primitive. All implementations must be thread-safe.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to a stream.
    ///
    /// The append is all-or-nothing. It fails with `ConcurrencyConflict`
    /// and writes nothing when the stream is not at `expected_version`.
    /// An `expected_version` of 0 requires the stream to be empty or absent.
    /// Events receive consecutive versions starting at `expected_version + 1`.
    async fn append(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<NewEvent>,
    ) -> Result<AppendResult>;

    /// Reads the events of a stream with a version greater than `from_version`.
    ///
    /// Events are returned in version order. A nonexistent stream, or one
    /// with nothing past `from_version`, yields an empty vector.
    async fn read(&self, stream_id: StreamId, from_version: Version)
    -> Result<Vec<EventEnvelope>>;

    /// Gets the current version of a stream.
    ///
    /// Returns None if the stream has no events.
    async fn stream_version(&self, stream_id: StreamId) -> Result<Option<Version>>;

    /// Streams every event in the store with a position greater than `after`.
    async fn read_all(&self, after: GlobalPosition) -> Result<EventStream>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends a single event to a stream.
    async fn append_one(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        event: NewEvent,
    ) -> Result<AppendResult> {
        self.append(stream_id, expected_version, vec![event]).await
    }

    /// Checks if a stream exists (has any events).
    async fn stream_exists(&self, stream_id: StreamId) -> Result<bool> {
        Ok(self.stream_version(stream_id).await?.is_some())
    }

    /// Reads a whole stream from its first event.
    async fn read_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>> {
        self.read(stream_id, Version::initial()).await
    }

    /// Reads a whole stream, treating an empty stream as `StreamNotFound`.
    async fn read_existing(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>> {
        let events = self.read_stream(stream_id).await?;
        if events.is_empty() {
            return Err(EventStoreError::StreamNotFound(stream_id));
        }
        Ok(events)
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates an append request before touching storage.
pub fn validate_append(
    stream_id: StreamId,
    expected_version: Version,
    events: &[NewEvent],
) -> Result<()> {
    if stream_id.is_nil() {
        return Err(EventStoreError::InvalidAppend(
            "Stream id must not be nil".to_string(),
        ));
    }

    if expected_version < Version::initial() {
        return Err(EventStoreError::InvalidAppend(format!(
            "Expected version must not be negative, got {expected_version}"
        )));
    }

    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event list".to_string(),
        ));
    };

    for event in events {
        if event.event_type.is_empty() {
            return Err(EventStoreError::InvalidAppend(
                "Event type must not be empty".to_string(),
            ));
        }
        if event.stream_type != first.stream_type {
            return Err(EventStoreError::InvalidAppend(
                "All events must have the same stream type".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(stream_type: &str, event_type: &str) -> NewEvent {
        NewEvent::new(stream_type, event_type, serde_json::json!({}))
    }

    #[test]
    fn rejects_empty_batch() {
        let result = validate_append(StreamId::new(), Version::initial(), &[]);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_mixed_stream_types() {
        let events = vec![event("User", "UserCreated"), event("Cart", "ProductAdded")];
        let result = validate_append(StreamId::new(), Version::initial(), &events);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_nil_stream_and_negative_version() {
        let events = vec![event("User", "UserCreated")];
        let nil = StreamId::from_uuid(uuid::Uuid::nil());
        assert!(validate_append(nil, Version::initial(), &events).is_err());
        assert!(validate_append(StreamId::new(), Version::new(-1), &events).is_err());
    }

    #[test]
    fn accepts_consistent_batch() {
        let events = vec![
            event("User", "UserCreated"),
            event("User", "UserNameUpdated"),
        ];
        assert!(validate_append(StreamId::new(), Version::new(4), &events).is_ok());
    }
}
