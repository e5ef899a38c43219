//! Checkpoint-driven re-publishing of committed envelopes.

use std::future::Future;
use std::time::Duration;

use event_store::{EventStore, GlobalPosition};
use futures_util::StreamExt;

use crate::{PublishError, PublisherBridge, Result};

/// Outcome of one reconciliation sweep.
#[derive(Debug)]
pub struct SweepReport {
    /// Number of envelopes delivered during the sweep.
    pub republished: usize,

    /// Position of the last envelope confirmed delivered. The next sweep
    /// starts after it.
    pub checkpoint: GlobalPosition,

    /// The retryable delivery failure that ended the sweep early, if any.
    pub failure: Option<PublishError>,

    /// Envelopes the bus rejected outright. The checkpoint moves past them
    /// and no later sweep offers them again.
    pub dead_lettered: Vec<PublishError>,
}

impl SweepReport {
    /// Returns true if the sweep reached the end of the log.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Re-publishes everything the store holds after a checkpoint.
///
/// Covers the window between a committed append and a failed publish:
/// anything past the checkpoint is sent again, so consumers may see an
/// envelope more than once. Only envelopes the bus rejects outright are
/// left undelivered, and each one is reported in
/// [`SweepReport::dead_lettered`].
pub struct Reconciler<S: EventStore> {
    store: S,
    bridge: PublisherBridge,
}

impl<S: EventStore> Reconciler<S> {
    /// Creates a reconciler reading from `store` and publishing via `bridge`.
    pub fn new(store: S, bridge: PublisherBridge) -> Self {
        Self { store, bridge }
    }

    /// Publishes every envelope after `checkpoint`, in global order.
    ///
    /// An envelope the bus rejects is dead-lettered in the report and
    /// passed over. Any other failure stops the sweep, and the report's
    /// checkpoint is then the position just before the failed envelope.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self, checkpoint: GlobalPosition) -> Result<SweepReport> {
        let mut stream = self.store.read_all(checkpoint).await?;
        let mut report = SweepReport {
            republished: 0,
            checkpoint,
            failure: None,
            dead_lettered: Vec::new(),
        };

        while let Some(result) = stream.next().await {
            let envelope = result?;

            match self.bridge.publish_one(&envelope).await {
                Ok(_) => {
                    report.republished += 1;
                    metrics::counter!("publisher_envelopes_reconciled").increment(1);
                }
                Err((attempts, source)) => {
                    let retryable = source.is_retryable();
                    let error = PublishError::Delivery {
                        stream_id: envelope.stream_id(),
                        event_id: envelope.event_id(),
                        global_position: envelope.global_position(),
                        attempts,
                        remaining: 1,
                        source,
                    };

                    if retryable {
                        tracing::warn!(
                            checkpoint = %report.checkpoint,
                            failed_position = %envelope.global_position(),
                            "reconciliation sweep stopped early"
                        );
                        report.failure = Some(error);
                        return Ok(report);
                    }

                    metrics::counter!("publisher_envelopes_dead_lettered").increment(1);
                    tracing::warn!(
                        event_id = %envelope.event_id(),
                        event_type = envelope.event_type(),
                        global_position = %envelope.global_position(),
                        error = %error,
                        "envelope rejected by bus, dead-lettered"
                    );
                    report.dead_lettered.push(error);
                }
            }

            report.checkpoint = envelope.global_position();
        }

        tracing::debug!(
            republished = report.republished,
            dead_lettered = report.dead_lettered.len(),
            checkpoint = %report.checkpoint,
            "reconciliation sweep complete"
        );

        Ok(report)
    }

    /// Sweeps every `interval` until `shutdown` resolves.
    ///
    /// Returns the last confirmed checkpoint. Store errors are logged and
    /// the sweep is tried again on the next tick.
    pub async fn run<F>(
        &self,
        mut checkpoint: GlobalPosition,
        interval: Duration,
        shutdown: F,
    ) -> GlobalPosition
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(checkpoint = %checkpoint, "reconciler stopping");
                    return checkpoint;
                }
                _ = ticker.tick() => {
                    match self.sweep(checkpoint).await {
                        Ok(report) => checkpoint = report.checkpoint,
                        Err(error) => tracing::error!(error = %error, "reconciliation sweep failed"),
                    }
                }
            }
        }
    }
}
