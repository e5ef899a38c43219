use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgPoolOptions, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CausationId, CorrelationId, EventEnvelope, EventId, EventMetadata, EventStoreError,
    GlobalPosition, NewEvent, Result, StreamId, Version,
    store::{AppendResult, EventStore, EventStream, validate_append},
};

/// Number of rows fetched per round trip by [`EventStore::read_all`].
const READ_ALL_BATCH_SIZE: i64 = 500;

/// PostgreSQL-backed event store implementation.
///
/// Each append runs in its own transaction. The transaction value is
/// created by `append`, handed explicitly to every step, and either
/// committed at the end or rolled back when dropped on any other exit path
/// (including cancellation of the append future).
///
/// Global positions become visible in position order. An append takes
/// [`Self::POSITION_LOCK_KEY`] as a transaction-scoped advisory lock before
/// drawing positions and holds it until commit or rollback, so a reader
/// that sees position N has already seen every committed position below N.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Advisory lock key serializing global position allocation.
    pub const POSITION_LOCK_KEY: i64 = 0x6576_656e_7473;

    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_envelope(row: PgRow) -> Result<EventEnvelope> {
        let metadata = EventMetadata {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
            stream_version: Version::new(row.try_get("stream_version")?),
            global_position: GlobalPosition::new(row.try_get("global_position")?),
            causation_id: row
                .try_get::<Option<Uuid>, _>("causation_id")?
                .map(CausationId::from_uuid),
            correlation_id: CorrelationId::from_uuid(row.try_get::<Uuid, _>("correlation_id")?),
            recorded_at: row.try_get("recorded_at")?,
        };

        Ok(EventEnvelope::from_parts(
            StreamId::from_uuid(row.try_get::<Uuid, _>("stream_id")?),
            row.try_get("stream_type")?,
            row.try_get("event_type")?,
            row.try_get("payload")?,
            metadata,
        ))
    }

    /// Reads the persisted stream version, locking the stream row until
    /// the transaction ends.
    async fn lock_stream(tx: &mut Transaction<'_, Postgres>, stream_id: StreamId) -> Result<Version> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM streams WHERE id = $1 FOR UPDATE")
                .bind(stream_id.as_uuid())
                .fetch_optional(&mut **tx)
                .await?;

        Ok(version.map(Version::new).unwrap_or_default())
    }

    /// Moves the stream row from `expected` to `new_version`.
    ///
    /// Returns false when another writer got there first. For a brand new
    /// stream this also covers two writers racing to insert the first row:
    /// the loser's insert falls through to the guarded update and matches
    /// nothing.
    async fn advance_stream(
        tx: &mut Transaction<'_, Postgres>,
        stream_id: StreamId,
        stream_type: &str,
        expected: Version,
        new_version: Version,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO streams (id, stream_type, version)
            VALUES ($1, $2, $4)
            ON CONFLICT (id) DO UPDATE SET version = EXCLUDED.version
            WHERE streams.version = $3
            "#,
        )
        .bind(stream_id.as_uuid())
        .bind(stream_type)
        .bind(expected.as_i64())
        .bind(new_version.as_i64())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Waits until no other append holds uncommitted global positions.
    async fn lock_positions(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(Self::POSITION_LOCK_KEY)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn insert_event(
        tx: &mut Transaction<'_, Postgres>,
        stream_id: StreamId,
        expected: Version,
        version: Version,
        event: NewEvent,
    ) -> Result<EventEnvelope> {
        let event_id = EventId::new();

        let row = sqlx::query(
            r#"
            INSERT INTO events (event_id, stream_id, stream_type, event_type, stream_version, payload, correlation_id, causation_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING global_position, recorded_at
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(stream_id.as_uuid())
        .bind(&event.stream_type)
        .bind(&event.event_type)
        .bind(version.as_i64())
        .bind(&event.payload)
        .bind(event.context.correlation_id.as_uuid())
        .bind(event.context.causation_id.map(|id| id.as_uuid()))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            // The stream row lock normally prevents this; the unique
            // constraint is the last line of version contiguity.
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_stream_version")
            {
                return EventStoreError::ConcurrencyConflict {
                    stream_id,
                    expected,
                    actual: version,
                };
            }
            EventStoreError::Database(e)
        })?;

        let global_position = GlobalPosition::new(row.try_get("global_position")?);
        let recorded_at = row.try_get("recorded_at")?;

        Ok(EventEnvelope::record(
            stream_id,
            event,
            version,
            global_position,
            event_id,
            recorded_at,
        ))
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[tracing::instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<NewEvent>,
    ) -> Result<AppendResult> {
        validate_append(stream_id, expected_version, &events)?;

        let total = events.len();
        let new_version = expected_version.advance(total);
        let stream_type = events[0].stream_type.clone();

        let mut tx = self.pool.begin().await?;

        let actual = Self::lock_stream(&mut tx, stream_id).await?;
        if actual != expected_version {
            metrics::counter!("event_store_concurrency_conflicts").increment(1);
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual,
            });
        }

        if !Self::advance_stream(&mut tx, stream_id, &stream_type, expected_version, new_version)
            .await?
        {
            metrics::counter!("event_store_concurrency_conflicts").increment(1);
            let actual = Self::lock_stream(&mut tx, stream_id).await?;
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual,
            });
        }

        // Taken after the stream row lock, so lock order is always stream
        // then positions.
        Self::lock_positions(&mut tx).await?;

        let mut envelopes = Vec::with_capacity(total);
        let mut version = expected_version;
        for event in events {
            version = version.next();
            envelopes
                .push(Self::insert_event(&mut tx, stream_id, expected_version, version, event).await?);
        }

        tx.commit().await?;
        metrics::counter!("event_store_events_appended").increment(total as u64);

        Ok(AppendResult {
            version: new_version,
            envelopes,
        })
    }

    async fn read(
        &self,
        stream_id: StreamId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>> {
        let rows = sqlx::query(
            r#"
            SELECT global_position, event_id, stream_id, stream_type, event_type, stream_version,
                   payload, correlation_id, causation_id, recorded_at
            FROM events
            WHERE stream_id = $1 AND stream_version > $2
            ORDER BY stream_version ASC
            "#,
        )
        .bind(stream_id.as_uuid())
        .bind(from_version.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_envelope).collect()
    }

    async fn stream_version(&self, stream_id: StreamId) -> Result<Option<Version>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM streams WHERE id = $1 AND version > 0")
                .bind(stream_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(version.map(Version::new))
    }

    async fn read_all(&self, after: GlobalPosition) -> Result<EventStream> {
        struct Cursor {
            pool: PgPool,
            after: GlobalPosition,
            buffer: VecDeque<EventEnvelope>,
            exhausted: bool,
        }

        let cursor = Cursor {
            pool: self.pool.clone(),
            after,
            buffer: VecDeque::new(),
            exhausted: false,
        };

        // Keyset pagination by position so the stream owns its pool handle.
        let stream = futures_util::stream::try_unfold(cursor, |mut cursor| async move {
            if cursor.buffer.is_empty() && !cursor.exhausted {
                let rows = sqlx::query(
                    r#"
                    SELECT global_position, event_id, stream_id, stream_type, event_type, stream_version,
                           payload, correlation_id, causation_id, recorded_at
                    FROM events
                    WHERE global_position > $1
                    ORDER BY global_position ASC
                    LIMIT $2
                    "#,
                )
                .bind(cursor.after.as_i64())
                .bind(READ_ALL_BATCH_SIZE)
                .fetch_all(&cursor.pool)
                .await?;

                cursor.exhausted = (rows.len() as i64) < READ_ALL_BATCH_SIZE;
                for row in rows {
                    cursor.buffer.push_back(Self::row_to_envelope(row)?);
                }
            }

            match cursor.buffer.pop_front() {
                Some(envelope) => {
                    cursor.after = envelope.global_position();
                    Ok::<_, EventStoreError>(Some((envelope, cursor)))
                }
                None => Ok(None),
            }
        });

        Ok(Box::pin(stream))
    }
}
