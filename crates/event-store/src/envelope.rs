//! Event envelopes and the metadata the store attaches to every event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::StreamId;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_newtype!(
    /// Unique identifier of a stored event. Assigned by the store on append.
    EventId
);

uuid_newtype!(
    /// Identifier shared by every event of one logical business transaction.
    CorrelationId
);

uuid_newtype!(
    /// Identifier of the command or event that directly produced an event.
    CausationId
);

impl From<EventId> for CausationId {
    fn from(id: EventId) -> Self {
        Self(id.0)
    }
}

/// Version of a stream, used for optimistic concurrency control.
///
/// An empty stream is at version 0. Each appended event takes the next
/// version, so the version of the last event equals the number of events
/// in the stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version of an empty or nonexistent stream (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version of the first event (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the version reached after `count` more events.
    pub fn advance(&self, count: usize) -> Self {
        Self(self.0 + count as i64)
    }

    /// Returns true for the version of an empty stream.
    pub fn is_initial(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Store-wide ordinal of an event, independent of its stream.
///
/// Strictly increasing across all appends and never reused. Gaps are
/// allowed: a rolled-back append may consume positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GlobalPosition(i64);

impl GlobalPosition {
    /// Creates a position from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The position before the first event of the store.
    pub fn start() -> Self {
        Self(0)
    }

    /// Returns the next position.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw position value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for GlobalPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Causal context the command layer threads into the events it produces.
///
/// These are the only metadata fields an author supplies; everything else
/// in [`EventMetadata`] is assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// Shared by all events of one business transaction.
    pub correlation_id: CorrelationId,

    /// The command or event that triggered this one, if known.
    pub causation_id: Option<CausationId>,
}

impl EventContext {
    /// Starts a new business transaction with no known cause.
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            causation_id: None,
        }
    }

    /// Context for events produced while handling a command.
    ///
    /// The command id becomes the causation id. The correlation continues
    /// when the command was issued as part of an existing transaction.
    pub fn for_command(command_id: Uuid, correlation_id: Option<CorrelationId>) -> Self {
        Self {
            correlation_id: correlation_id.unwrap_or_default(),
            causation_id: Some(CausationId::from_uuid(command_id)),
        }
    }

    /// Context for events produced while processing an inbound event.
    ///
    /// The inbound correlation id propagates unchanged.
    pub fn caused_by(envelope: &EventEnvelope) -> Self {
        Self {
            correlation_id: envelope.metadata.correlation_id,
            causation_id: Some(envelope.metadata.event_id.into()),
        }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An event as handed to the store for appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// The type of aggregate owning the stream (e.g. "User", "ShoppingCart").
    pub stream_type: String,

    /// Discriminator of the payload's concrete kind (e.g. "UserCreated").
    pub event_type: String,

    /// The event payload as JSON.
    pub payload: serde_json::Value,

    /// Correlation and causation supplied by the command layer.
    pub context: EventContext,
}

impl NewEvent {
    /// Creates a new event from a raw JSON payload, starting a fresh context.
    pub fn new(
        stream_type: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            stream_type: stream_type.into(),
            event_type: event_type.into(),
            payload,
            context: EventContext::new(),
        }
    }

    /// Creates a new event from a serializable payload.
    pub fn from_payload<T: Serialize>(
        stream_type: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            stream_type,
            event_type,
            serde_json::to_value(payload)?,
        ))
    }

    /// Sets the causal context.
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }
}

/// Metadata assigned to an event when it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique identifier of this event.
    pub event_id: EventId,

    /// Position of the event within its stream, starting at 1.
    pub stream_version: Version,

    /// Store-wide position of the event.
    pub global_position: GlobalPosition,

    /// The command or event that produced this one.
    pub causation_id: Option<CausationId>,

    /// The business transaction this event belongs to.
    pub correlation_id: CorrelationId,

    /// When the store committed the event. Never read during replay.
    pub recorded_at: DateTime<Utc>,
}

/// A stored event: payload plus metadata.
///
/// Envelopes only come out of the store (or off the wire), so fields are
/// read through accessors and never change after the append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    stream_id: StreamId,
    stream_type: String,
    event_type: String,
    payload: serde_json::Value,
    metadata: EventMetadata,
}

impl EventEnvelope {
    /// Records a new event at the given stream version and global position.
    pub(crate) fn record(
        stream_id: StreamId,
        event: NewEvent,
        stream_version: Version,
        global_position: GlobalPosition,
        event_id: EventId,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stream_id,
            stream_type: event.stream_type,
            event_type: event.event_type,
            payload: event.payload,
            metadata: EventMetadata {
                event_id,
                stream_version,
                global_position,
                causation_id: event.context.causation_id,
                correlation_id: event.context.correlation_id,
                recorded_at,
            },
        }
    }

    /// Rebuilds an envelope from persisted parts.
    pub(crate) fn from_parts(
        stream_id: StreamId,
        stream_type: String,
        event_type: String,
        payload: serde_json::Value,
        metadata: EventMetadata,
    ) -> Self {
        Self {
            stream_id,
            stream_type,
            event_type,
            payload,
            metadata,
        }
    }

    /// The stream this event belongs to.
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// The aggregate type owning the stream.
    pub fn stream_type(&self) -> &str {
        &self.stream_type
    }

    /// Discriminator of the payload kind.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The raw JSON payload.
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn event_id(&self) -> EventId {
        self.metadata.event_id
    }

    pub fn version(&self) -> Version {
        self.metadata.stream_version
    }

    pub fn global_position(&self) -> GlobalPosition {
        self.metadata.global_position
    }

    /// Deserializes the payload into a concrete event type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
