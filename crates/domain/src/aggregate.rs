//! Core aggregate and domain event traits.

use common::StreamId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense. Each aggregate
/// declares one closed enum of event kinds.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Every discriminator this event enum can carry.
    ///
    /// A stored event whose type is not listed here cannot be replayed.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the event type name.
    ///
    /// Stored next to the payload as the envelope's `event_type`.
    fn event_type(&self) -> &'static str;

    /// Returns true if `event_type` is one of [`Self::EVENT_TYPES`].
    fn is_known(event_type: &str) -> bool {
        Self::EVENT_TYPES.contains(&event_type)
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a cluster of domain objects that can be treated as a single unit.
/// The aggregate root ensures consistency of changes being made within the aggregate.
///
/// In event sourcing, aggregates:
/// - Are rebuilt by replaying events from their zero value
/// - Generate events from commands
/// - Apply events to update state (pure, deterministic)
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    ///
    /// Stored as the stream type of every event the aggregate produces.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<StreamId>;

    /// Returns the current version of the aggregate.
    ///
    /// Version starts at 0 for a new aggregate and increments with each event.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the aggregator and the command handler, never by `apply`.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not read the clock, draw random numbers, or do I/O
    /// - It must not fail (events represent facts that have happened)
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence, advancing the version by one each.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
            self.set_version(self.version().next());
        }
    }

    /// Builds an aggregate from its zero value and already-typed events.
    fn replay(events: impl IntoIterator<Item = Self::Event>) -> Self {
        let mut aggregate = Self::default();
        aggregate.apply_events(events);
        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Created { id: StreamId },
        Updated { value: i32 },
    }

    impl DomainEvent for TestEvent {
        const EVENT_TYPES: &'static [&'static str] = &["TestCreated", "TestUpdated"];

        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Created { .. } => "TestCreated",
                TestEvent::Updated { .. } => "TestUpdated",
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct TestAggregate {
        id: Option<StreamId>,
        value: i32,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("test error")]
    struct TestError;

    impl Aggregate for TestAggregate {
        type Event = TestEvent;
        type Error = TestError;

        fn aggregate_type() -> &'static str {
            "TestAggregate"
        }

        fn id(&self) -> Option<StreamId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                TestEvent::Created { id } => self.id = Some(id),
                TestEvent::Updated { value } => self.value = value,
            }
        }
    }

    #[test]
    fn replay_counts_versions() {
        let id = StreamId::new();
        let aggregate = TestAggregate::replay(vec![
            TestEvent::Created { id },
            TestEvent::Updated { value: 42 },
        ]);

        assert_eq!(aggregate.id(), Some(id));
        assert_eq!(aggregate.value, 42);
        assert_eq!(aggregate.version(), Version::new(2));
    }

    #[test]
    fn replay_is_deterministic() {
        let events = vec![
            TestEvent::Created { id: StreamId::new() },
            TestEvent::Updated { value: 1 },
            TestEvent::Updated { value: 7 },
        ];

        assert_eq!(
            TestAggregate::replay(events.clone()),
            TestAggregate::replay(events)
        );
    }

    #[test]
    fn known_event_types() {
        assert!(TestEvent::is_known("TestCreated"));
        assert!(!TestEvent::is_known("TestDeleted"));
        assert_eq!(TestEvent::Updated { value: 1 }.event_type(), "TestUpdated");
    }
}
