//! Rebuilding aggregate state from stored envelopes.

use common::StreamId;
use event_store::{EventEnvelope, Version};
use thiserror::Error;

use crate::aggregate::{Aggregate, DomainEvent};

/// A stream that cannot be folded into its aggregate.
///
/// Replay errors mean the stored history and the code disagree. They are
/// never retried.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The stream holds an event kind the aggregate does not know.
    #[error(
        "Replay divergence in {aggregate_type} stream {stream_id}: unknown event type {event_type} at version {version}"
    )]
    UnknownEventType {
        aggregate_type: &'static str,
        stream_id: StreamId,
        event_type: String,
        version: Version,
    },

    /// The payload decodes to a different kind than the stored discriminator.
    #[error(
        "Replay divergence in stream {stream_id} at version {version}: stored as {stored} but payload is {decoded}"
    )]
    MismatchedEventType {
        stream_id: StreamId,
        version: Version,
        stored: String,
        decoded: &'static str,
    },

    /// Stream versions are not contiguous from 1.
    #[error("Replay divergence in stream {stream_id}: expected version {expected}, found {found}")]
    VersionGap {
        stream_id: StreamId,
        expected: Version,
        found: Version,
    },

    /// An envelope from another stream was handed in.
    #[error("Replay divergence in stream {stream_id}: envelope belongs to stream {found}")]
    ForeignEnvelope { stream_id: StreamId, found: StreamId },

    /// The payload does not decode into the aggregate's event enum.
    #[error("Failed to decode {event_type} at version {version} of stream {stream_id}: {source}")]
    Decode {
        stream_id: StreamId,
        version: Version,
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Folds a stream's envelopes, in order, into a fresh aggregate.
///
/// The result's version equals the number of envelopes folded, which is
/// the expected version for the next append. An empty slice yields the
/// aggregate's zero value at version 0.
pub fn aggregate_stream<A: Aggregate>(
    stream_id: StreamId,
    envelopes: &[EventEnvelope],
) -> Result<A, ReplayError> {
    let mut aggregate = A::default();

    for envelope in envelopes {
        let event = decode_next::<A>(stream_id, aggregate.version(), envelope)?;
        aggregate.apply(event);
        aggregate.set_version(envelope.version());
    }

    Ok(aggregate)
}

fn decode_next<A: Aggregate>(
    stream_id: StreamId,
    current: Version,
    envelope: &EventEnvelope,
) -> Result<A::Event, ReplayError> {
    if envelope.stream_id() != stream_id {
        return Err(ReplayError::ForeignEnvelope {
            stream_id,
            found: envelope.stream_id(),
        });
    }

    let expected = current.next();
    if envelope.version() != expected {
        return Err(ReplayError::VersionGap {
            stream_id,
            expected,
            found: envelope.version(),
        });
    }

    if !A::Event::is_known(envelope.event_type()) {
        return Err(ReplayError::UnknownEventType {
            aggregate_type: A::aggregate_type(),
            stream_id,
            event_type: envelope.event_type().to_string(),
            version: envelope.version(),
        });
    }

    let event: A::Event = envelope.decode().map_err(|source| ReplayError::Decode {
        stream_id,
        version: envelope.version(),
        event_type: envelope.event_type().to_string(),
        source,
    })?;

    if event.event_type() != envelope.event_type() {
        return Err(ReplayError::MismatchedEventType {
            stream_id,
            version: envelope.version(),
            stored: envelope.event_type().to_string(),
            decoded: event.event_type(),
        });
    }

    Ok(event)
}
