//! Command handling infrastructure.

use std::marker::PhantomData;

use common::StreamId;
use event_store::{EventContext, EventEnvelope, EventStore, EventStoreExt, NewEvent, Version};
use publisher::{PublishError, PublisherBridge};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::aggregator::aggregate_stream;
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The committed envelopes, carrying store-assigned metadata.
    pub envelopes: Vec<EventEnvelope>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,

    /// Set when the events were committed but could not be published.
    ///
    /// The append stands; a reconciliation sweep delivers them later.
    pub publish_error: Option<PublishError>,
}

impl<A: Aggregate> CommandResult<A> {
    /// Returns true if the committed events also reached the bus.
    pub fn is_published(&self) -> bool {
        self.publish_error.is_none()
    }
}

/// Trait for commands that can be executed against an aggregate.
///
/// Commands represent an intention to perform an action. They may be rejected
/// if the aggregate's current state doesn't allow the action.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the stream this command targets.
    fn stream_id(&self) -> StreamId;
}

/// Handler for executing commands against aggregates.
///
/// The handler is responsible for:
/// 1. Loading the aggregate by replaying its stream
/// 2. Executing the command to produce events
/// 3. Appending the events at the version read during load
/// 4. Handing the committed envelopes to the publisher, if one is attached
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    publisher: Option<PublisherBridge>,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            publisher: None,
            _phantom: PhantomData,
        }
    }

    /// Publishes committed events through `publisher`.
    pub fn with_publisher(mut self, publisher: PublisherBridge) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the attached publisher, if any.
    pub fn publisher(&self) -> Option<&PublisherBridge> {
        self.publisher.as_ref()
    }

    /// Loads an aggregate from the event store.
    ///
    /// If the stream doesn't exist, returns the aggregate's zero value.
    pub async fn load(&self, stream_id: StreamId) -> Result<A, DomainError> {
        let envelopes = self.store.read_stream(stream_id).await?;
        Ok(aggregate_stream(stream_id, &envelopes)?)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, stream_id: StreamId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(stream_id).await?;
        if aggregate.version().is_initial() {
            Ok(None)
        } else {
            Ok(Some(aggregate))
        }
    }

    /// Loads an aggregate, treating a missing stream as `NotFound`.
    pub async fn get(&self, stream_id: StreamId) -> Result<A, DomainError> {
        self.load_existing(stream_id)
            .await?
            .ok_or(DomainError::NotFound {
                aggregate_type: A::aggregate_type(),
                stream_id,
            })
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or an error. The events are appended
    /// with the version read during load, so a concurrent writer makes this
    /// fail with a concurrency conflict.
    pub async fn execute<F>(
        &self,
        stream_id: StreamId,
        context: EventContext,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        self.execute_inner(stream_id, None, context, command_fn)
            .await
    }

    /// Executes a command only if the stream is still at `expected_version`.
    ///
    /// For callers that read the aggregate earlier (e.g. a client echoing
    /// back the version it saw) and must not act on a newer state.
    pub async fn execute_at<F>(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        context: EventContext,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        self.execute_inner(stream_id, Some(expected_version), context, command_fn)
            .await
    }

    /// Executes a command, reloading and retrying on concurrency conflicts.
    ///
    /// Makes at most `max_attempts` attempts. Any other error is returned
    /// immediately.
    pub async fn execute_with_retry<F>(
        &self,
        stream_id: StreamId,
        context: EventContext,
        max_attempts: u32,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self
                .execute(stream_id, context, |aggregate| command_fn(aggregate))
                .await
            {
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    metrics::counter!("domain_command_retries").increment(1);
                    tracing::debug!(
                        %stream_id,
                        attempt,
                        error = %error,
                        "concurrency conflict, reloading"
                    );
                }
                result => return result,
            }
        }
    }

    async fn execute_inner<F>(
        &self,
        stream_id: StreamId,
        expected_version: Option<Version>,
        context: EventContext,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(stream_id).await?;
        let current_version = expected_version.unwrap_or_else(|| aggregate.version());

        // Execute command to get events
        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                envelopes: vec![],
                new_version: current_version,
                publish_error: None,
            });
        }

        let new_events = Self::build_events(&events, context)?;

        // Persist events with optimistic concurrency
        let appended = self
            .store
            .append(stream_id, current_version, new_events)
            .await?;

        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(appended.version);

        metrics::counter!("domain_commands_executed", "aggregate_type" => A::aggregate_type())
            .increment(1);

        let publish_error = match &self.publisher {
            Some(publisher) => publisher
                .publish_after_append(stream_id, &appended.envelopes)
                .await
                .err(),
            None => None,
        };

        if let Some(error) = &publish_error {
            tracing::warn!(
                %stream_id,
                aggregate_type = A::aggregate_type(),
                error = %error,
                "events committed but not published"
            );
        }

        Ok(CommandResult {
            aggregate,
            events,
            envelopes: appended.envelopes,
            new_version: appended.version,
            publish_error,
        })
    }

    /// Serializes domain events for the store, tagging each with `context`.
    fn build_events(
        events: &[A::Event],
        context: EventContext,
    ) -> Result<Vec<NewEvent>, DomainError> {
        events
            .iter()
            .map(|event| {
                Ok(
                    NewEvent::from_payload(A::aggregate_type(), event.event_type(), event)?
                        .with_context(context),
                )
            })
            .collect()
    }
}
