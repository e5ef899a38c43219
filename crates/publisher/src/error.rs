//! Publisher error types.

use std::time::Duration;

use common::StreamId;
use event_store::{EventId, EventStoreError, GlobalPosition};
use thiserror::Error;

/// Failure reported by a [`MessageBus`](crate::MessageBus) for one envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The bus refused the envelope. Retrying the same envelope won't help.
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// The bus could not be reached.
    #[error("Message bus unavailable: {0}")]
    Unavailable(String),

    /// The bus did not answer within the publish timeout.
    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),
}

impl BusError {
    /// Returns true if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BusError::Rejected(_))
    }
}

/// Errors raised while forwarding committed envelopes.
///
/// None of these undo the append that produced the envelopes.
#[derive(Debug, Error)]
pub enum PublishError {
    /// An envelope could not be delivered. Publishing stopped there.
    #[error(
        "Failed to publish event {event_id} at position {global_position} of stream {stream_id} \
         after {attempts} attempt(s), {remaining} envelope(s) left unpublished: {source}"
    )]
    Delivery {
        stream_id: StreamId,
        event_id: EventId,
        global_position: GlobalPosition,
        attempts: u32,
        remaining: usize,
        #[source]
        source: BusError,
    },

    /// Reading envelopes back from the store failed.
    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),
}

impl PublishError {
    /// Global position of the envelope that failed, if any.
    pub fn failed_position(&self) -> Option<GlobalPosition> {
        match self {
            PublishError::Delivery {
                global_position, ..
            } => Some(*global_position),
            PublishError::Store(_) => None,
        }
    }
}

/// Result type for publisher operations.
pub type Result<T> = std::result::Result<T, PublishError>;
