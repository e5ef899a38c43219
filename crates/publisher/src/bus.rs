//! Outbound message bus collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use event_store::EventEnvelope;
use tokio::sync::{RwLock, broadcast};

use crate::BusError;

/// Outbound messaging collaborator.
///
/// Receives one call per committed envelope. Delivery is at-least-once, so
/// consumers behind the bus must tolerate duplicates.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a single envelope.
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BusError>;
}

#[derive(Debug, Default)]
struct InMemoryBusState {
    published: Vec<EventEnvelope>,
    calls: usize,
    fail_next: usize,
    unavailable: bool,
    rejected_types: Vec<String>,
    latency: Option<Duration>,
}

/// In-memory bus recording every envelope it accepts.
///
/// Failures can be injected to exercise the bridge's retry and
/// reconciliation paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageBus {
    state: Arc<RwLock<InMemoryBusState>>,
}

impl InMemoryMessageBus {
    /// Creates a new in-memory bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` publish calls fail as unavailable.
    pub async fn fail_next(&self, count: usize) {
        self.state.write().await.fail_next = count;
    }

    /// Makes every publish call fail as unavailable until cleared.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Rejects every envelope of the given event type.
    pub async fn reject_event_type(&self, event_type: impl Into<String>) {
        self.state.write().await.rejected_types.push(event_type.into());
    }

    /// Delays every publish call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().await.latency = latency;
    }

    /// Returns the envelopes accepted so far, in publish order.
    pub async fn published(&self) -> Vec<EventEnvelope> {
        self.state.read().await.published.clone()
    }

    /// Returns the number of accepted envelopes.
    pub async fn published_count(&self) -> usize {
        self.state.read().await.published.len()
    }

    /// Returns the number of publish calls, including failed ones.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BusError> {
        let latency = {
            let mut state = self.state.write().await;
            state.calls += 1;
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;

        if state.unavailable {
            return Err(BusError::Unavailable("bus marked unavailable".to_string()));
        }

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(BusError::Unavailable("injected failure".to_string()));
        }

        if state
            .rejected_types
            .iter()
            .any(|t| t == envelope.event_type())
        {
            return Err(BusError::Rejected(format!(
                "event type {} is not accepted",
                envelope.event_type()
            )));
        }

        state.published.push(envelope.clone());
        Ok(())
    }
}

/// Bus fanning envelopes out to in-process subscribers.
///
/// Read models subscribe through [`BroadcastMessageBus::subscribe`]. A
/// publish with no live subscriber fails as unavailable, since nothing
/// would receive it.
#[derive(Debug, Clone)]
pub struct BroadcastMessageBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastMessageBus {
    /// Creates a bus buffering up to `capacity` envelopes per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new subscriber receiving every envelope published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastMessageBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl MessageBus for BroadcastMessageBus {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BusError> {
        self.sender
            .send(envelope.clone())
            .map(|_| ())
            .map_err(|_| BusError::Unavailable("no live subscribers".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_store::{EventStore, InMemoryEventStore, NewEvent, StreamId, Version};

    async fn envelope(event_type: &str) -> EventEnvelope {
        let store = InMemoryEventStore::new();
        let result = store
            .append(
                StreamId::new(),
                Version::initial(),
                vec![NewEvent::new("User", event_type, serde_json::json!({}))],
            )
            .await
            .unwrap();
        result.envelopes.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn in_memory_bus_records_envelopes() {
        let bus = InMemoryMessageBus::new();
        let env = envelope("UserCreated").await;

        bus.publish(&env).await.unwrap();

        assert_eq!(bus.published().await, vec![env]);
        assert_eq!(bus.call_count().await, 1);
    }

    #[tokio::test]
    async fn fail_next_fails_only_that_many_calls() {
        let bus = InMemoryMessageBus::new();
        let env = envelope("UserCreated").await;
        bus.fail_next(2).await;

        assert!(matches!(bus.publish(&env).await, Err(BusError::Unavailable(_))));
        assert!(matches!(bus.publish(&env).await, Err(BusError::Unavailable(_))));
        assert!(bus.publish(&env).await.is_ok());
        assert_eq!(bus.published_count().await, 1);
        assert_eq!(bus.call_count().await, 3);
    }

    #[tokio::test]
    async fn unavailable_until_cleared() {
        let bus = InMemoryMessageBus::new();
        let env = envelope("UserCreated").await;

        bus.set_unavailable(true).await;
        assert!(bus.publish(&env).await.is_err());
        bus.set_unavailable(false).await;
        assert!(bus.publish(&env).await.is_ok());
    }

    #[tokio::test]
    async fn rejected_types_are_refused() {
        let bus = InMemoryMessageBus::new();
        bus.reject_event_type("UserCreated").await;

        let result = bus.publish(&envelope("UserCreated").await).await;
        assert!(matches!(result, Err(BusError::Rejected(_))));
        assert!(bus.publish(&envelope("UserNameUpdated").await).await.is_ok());
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let bus = BroadcastMessageBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let env = envelope("UserCreated").await;

        bus.publish(&env).await.unwrap();

        assert_eq!(first.recv().await.unwrap(), env);
        assert_eq!(second.recv().await.unwrap(), env);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_unavailable() {
        let bus = BroadcastMessageBus::default();
        let result = bus.publish(&envelope("UserCreated").await).await;
        assert!(matches!(result, Err(BusError::Unavailable(_))));
    }
}
