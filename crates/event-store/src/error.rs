use thiserror::Error;

use crate::{StreamId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The expected version did not match the persisted version.
    /// Nothing was written; the caller should reload and retry.
    #[error(
        "Concurrency conflict for stream {stream_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        stream_id: StreamId,
        expected: Version,
        actual: Version,
    },

    /// The stream has no events.
    #[error("Stream not found: {0}")]
    StreamNotFound(StreamId),

    /// The append request was malformed (empty batch, mixed stream types...).
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// The storage layer is unavailable or failed mid-operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// True for the business-level conflict a caller resolves by reloading.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, EventStoreError::ConcurrencyConflict { .. })
    }

    /// True for infrastructure failures worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            EventStoreError::Unavailable(_) => true,
            EventStoreError::Database(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_conflicts_and_transient_failures() {
        let conflict = EventStoreError::ConcurrencyConflict {
            stream_id: StreamId::new(),
            expected: Version::first(),
            actual: Version::new(2),
        };
        assert!(conflict.is_concurrency_conflict());
        assert!(!conflict.is_transient());

        let unavailable = EventStoreError::Unavailable("disk full".to_string());
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_concurrency_conflict());

        assert!(EventStoreError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!EventStoreError::InvalidAppend("empty".to_string()).is_transient());
    }

    #[test]
    fn conflict_message_names_both_versions() {
        let stream_id = StreamId::new();
        let err = EventStoreError::ConcurrencyConflict {
            stream_id,
            expected: Version::first(),
            actual: Version::new(2),
        };
        assert_eq!(
            err.to_string(),
            format!("Concurrency conflict for stream {stream_id}: expected version 1, found 2")
        );
    }
}
