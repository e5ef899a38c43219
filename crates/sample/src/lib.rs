//! Sample application for the event-sourcing system.
//!
//! Wires the sample services to a store and a broadcast bus, runs a scripted
//! flow through every module, then keeps a reconciliation sweep running so
//! events whose publish failed still reach subscribers.

pub mod config;
pub mod error;
pub mod scenario;

use std::future::Future;
use std::sync::Arc;

use event_store::{EventStore, GlobalPosition};
use publisher::{BroadcastMessageBus, PublisherBridge, Reconciler};
use tokio::sync::broadcast::error::RecvError;

pub use config::{Config, LogFormat};
pub use error::{Result, SampleError};
pub use scenario::{ScenarioReport, run_scenario};

/// Runs the scenario against `store` and reconciles until `shutdown` resolves.
///
/// Returns the reconciler's final checkpoint.
pub async fn run<S, F>(store: S, config: &Config, shutdown: F) -> Result<GlobalPosition>
where
    S: EventStore + Clone + 'static,
    F: Future<Output = ()>,
{
    let bus = BroadcastMessageBus::default();
    let consumer = tokio::spawn(log_deliveries(bus.subscribe()));
    let bridge = PublisherBridge::new(Arc::new(bus)).with_policy(config.retry_policy());

    let report = run_scenario(store.clone(), bridge.clone()).await?;
    if !report.all_published() {
        tracing::warn!(
            unpublished = report.unpublished,
            "some events were not published, reconciliation will deliver them"
        );
    }

    let reconciler = Reconciler::new(store, bridge);
    let checkpoint = reconciler
        .run(report.reconcile_from(), config.reconcile_interval, shutdown)
        .await;

    consumer.abort();
    Ok(checkpoint)
}

/// Logs every envelope a bus subscriber receives.
async fn log_deliveries(mut rx: tokio::sync::broadcast::Receiver<event_store::EventEnvelope>) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                metrics::counter!("sample_envelopes_received").increment(1);
                tracing::info!(
                    stream_type = envelope.stream_type(),
                    event_type = envelope.event_type(),
                    stream_id = %envelope.stream_id(),
                    version = %envelope.version(),
                    global_position = %envelope.global_position(),
                    "received event"
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "subscriber lagged behind the bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
