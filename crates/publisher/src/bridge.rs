//! Publisher bridge between the event store and the message bus.

use std::sync::Arc;

use common::StreamId;
use event_store::EventEnvelope;

use crate::{BusError, MessageBus, PublishError, Result, RetryPolicy};

/// Forwards committed envelopes to a [`MessageBus`].
///
/// The bridge is only handed envelopes the store has already committed.
/// A failed publish is reported to the caller but never undoes the append;
/// the [`Reconciler`](crate::Reconciler) picks up what was missed.
#[derive(Clone)]
pub struct PublisherBridge {
    bus: Arc<dyn MessageBus>,
    policy: RetryPolicy,
}

impl PublisherBridge {
    /// Creates a bridge with the default retry policy.
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            bus,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Publishes the envelopes of one committed append, in order.
    ///
    /// Stops at the first envelope that can't be delivered within the retry
    /// policy; the envelopes after it are not attempted.
    #[tracing::instrument(skip(self, envelopes), fields(envelope_count = envelopes.len()))]
    pub async fn publish_after_append(
        &self,
        stream_id: StreamId,
        envelopes: &[EventEnvelope],
    ) -> Result<()> {
        for (index, envelope) in envelopes.iter().enumerate() {
            self.publish_one(envelope)
                .await
                .map_err(|(attempts, source)| PublishError::Delivery {
                    stream_id,
                    event_id: envelope.event_id(),
                    global_position: envelope.global_position(),
                    attempts,
                    remaining: envelopes.len() - index,
                    source,
                })?;
        }

        Ok(())
    }

    /// Publishes a single envelope under the retry policy.
    ///
    /// Returns the number of attempts used, or the last bus error together
    /// with the attempts made.
    pub(crate) async fn publish_one(
        &self,
        envelope: &EventEnvelope,
    ) -> std::result::Result<u32, (u32, BusError)> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome =
                match tokio::time::timeout(self.policy.publish_timeout, self.bus.publish(envelope))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(BusError::Timeout(self.policy.publish_timeout)),
                };

            match outcome {
                Ok(()) => {
                    metrics::counter!("publisher_envelopes_published").increment(1);
                    if attempt > 1 {
                        tracing::info!(
                            event_id = %envelope.event_id(),
                            attempt,
                            "envelope published after retry"
                        );
                    }
                    return Ok(attempt);
                }
                Err(error) if !error.is_retryable() || attempt >= self.policy.max_attempts => {
                    metrics::counter!("publisher_publish_failures").increment(1);
                    tracing::error!(
                        event_id = %envelope.event_id(),
                        global_position = %envelope.global_position(),
                        attempt,
                        error = %error,
                        "giving up on envelope"
                    );
                    return Err((attempt, error));
                }
                Err(error) => {
                    let delay = self.policy.delay_after(attempt);
                    metrics::counter!("publisher_publish_retries").increment(1);
                    tracing::warn!(
                        event_id = %envelope.event_id(),
                        attempt,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "publish failed, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
