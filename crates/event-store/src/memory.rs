use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    EventEnvelope, EventId, EventStoreError, GlobalPosition, NewEvent, Result, StreamId, Version,
    store::{AppendResult, EventStore, EventStream, validate_append},
};

#[derive(Debug, Default)]
struct MemoryState {
    /// Every envelope in global position order.
    log: Vec<EventEnvelope>,
    /// Indices into `log` for each stream, in version order.
    streams: HashMap<StreamId, Vec<usize>>,
    last_position: GlobalPosition,
    /// Injected failure for the next append, after staging this many events.
    fail_after: Option<usize>,
}

impl MemoryState {
    fn current_version(&self, stream_id: StreamId) -> Version {
        self.streams
            .get(&stream_id)
            .map(|indices| Version::initial().advance(indices.len()))
            .unwrap_or_default()
    }

    fn commit(&mut self, stream_id: StreamId, staged: &[EventEnvelope]) {
        let indices = self.streams.entry(stream_id).or_default();
        for envelope in staged {
            indices.push(self.log.len());
            self.log.push(envelope.clone());
            self.last_position = envelope.global_position();
        }
    }
}

/// In-memory event store implementation for testing.
///
/// This implementation stores all events in memory and provides
/// the same interface as the PostgreSQL implementation. The version check,
/// staging and commit of an append all happen under one write guard, so
/// a dropped append future never leaves part of its batch behind.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    state: Arc<RwLock<MemoryState>>,
    latency: Option<Duration>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends every append for `latency` between staging and commit.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next append fail after staging `persisted` of its events.
    pub async fn fail_after(&self, persisted: usize) {
        self.state.write().await.fail_after = Some(persisted);
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.state.read().await.log.len()
    }

    /// Clears all events. Positions keep increasing after a clear.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.log.clear();
        state.streams.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<NewEvent>,
    ) -> Result<AppendResult> {
        validate_append(stream_id, expected_version, &events)?;

        let mut state = self.state.write().await;

        let actual = state.current_version(stream_id);
        if actual != expected_version {
            metrics::counter!("event_store_concurrency_conflicts").increment(1);
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual,
            });
        }

        let fail_after = state.fail_after.take();
        let total = events.len();
        let recorded_at = Utc::now();
        let mut staged = Vec::with_capacity(total);
        let mut version = expected_version;
        let mut position = state.last_position;

        for event in events {
            if fail_after.is_some_and(|limit| staged.len() >= limit) {
                tracing::warn!(staged = staged.len(), total, "injected storage failure");
                return Err(EventStoreError::Unavailable(format!(
                    "storage failed after {} of {} events",
                    staged.len(),
                    total
                )));
            }
            version = version.next();
            position = position.next();
            staged.push(EventEnvelope::record(
                stream_id,
                event,
                version,
                position,
                EventId::new(),
                recorded_at,
            ));
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        state.commit(stream_id, &staged);
        metrics::counter!("event_store_events_appended").increment(total as u64);

        Ok(AppendResult {
            version,
            envelopes: staged,
        })
    }

    async fn read(
        &self,
        stream_id: StreamId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>> {
        let state = self.state.read().await;
        let events = state
            .streams
            .get(&stream_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| &state.log[index])
                    .filter(|e| e.version() > from_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    async fn stream_version(&self, stream_id: StreamId) -> Result<Option<Version>> {
        let state = self.state.read().await;
        Ok(state
            .streams
            .get(&stream_id)
            .filter(|indices| !indices.is_empty())
            .map(|indices| Version::initial().advance(indices.len())))
    }

    async fn read_all(&self, after: GlobalPosition) -> Result<EventStream> {
        use futures_util::stream;

        let state = self.state.read().await;
        let events: Vec<_> = state
            .log
            .iter()
            .filter(|e| e.global_position() > after)
            .cloned()
            .collect();

        let stream = stream::iter(events.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }
}
