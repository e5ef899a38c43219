//! Integration tests: store append → publisher bridge → bus subscribers.

use std::sync::Arc;
use std::time::Duration;

use event_store::{
    EventContext, EventStore, EventStoreExt, GlobalPosition, InMemoryEventStore, NewEvent,
    StreamId, Version,
};
use publisher::{
    BroadcastMessageBus, InMemoryMessageBus, PublishError, PublisherBridge, Reconciler,
    RetryPolicy,
};

fn policy() -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(2)
        .with_initial_delay(Duration::from_millis(1))
        .with_publish_timeout(Duration::from_millis(200))
}

fn user_event(event_type: &str, name: &str) -> NewEvent {
    NewEvent::new("User", event_type, serde_json::json!({ "user_name": name }))
}

#[tokio::test]
async fn subscribers_see_committed_envelopes_in_order() {
    let store = InMemoryEventStore::new();
    let bus = BroadcastMessageBus::new(64);
    let mut subscriber = bus.subscribe();
    let bridge = PublisherBridge::new(Arc::new(bus.clone())).with_policy(policy());
    let stream_id = StreamId::new();

    let created = store
        .append_one(stream_id, Version::initial(), user_event("UserCreated", "John Doe"))
        .await
        .unwrap();
    bridge
        .publish_after_append(stream_id, &created.envelopes)
        .await
        .unwrap();

    let renamed = store
        .append_one(stream_id, created.version, user_event("UserNameUpdated", "Adam Smith"))
        .await
        .unwrap();
    bridge
        .publish_after_append(stream_id, &renamed.envelopes)
        .await
        .unwrap();

    let first = subscriber.recv().await.unwrap();
    let second = subscriber.recv().await.unwrap();
    assert_eq!(first.event_type(), "UserCreated");
    assert_eq!(second.event_type(), "UserNameUpdated");
    assert!(first.global_position() < second.global_position());
}

#[tokio::test]
async fn failed_publish_keeps_events_and_sweep_delivers_them() {
    let store = InMemoryEventStore::new();
    let bus = InMemoryMessageBus::new();
    let bridge = PublisherBridge::new(Arc::new(bus.clone())).with_policy(policy());
    let stream_id = StreamId::new();

    bus.set_unavailable(true).await;
    let appended = store
        .append(
            stream_id,
            Version::initial(),
            vec![
                user_event("UserCreated", "John Doe"),
                user_event("UserNameUpdated", "Adam Smith"),
            ],
        )
        .await
        .unwrap();

    let err = bridge
        .publish_after_append(stream_id, &appended.envelopes)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Delivery { remaining: 2, .. }));

    // The append stands.
    assert_eq!(store.stream_version(stream_id).await.unwrap(), Some(Version::new(2)));
    assert_eq!(bus.published_count().await, 0);

    bus.set_unavailable(false).await;
    let reconciler = Reconciler::new(store.clone(), bridge);
    let report = reconciler.sweep(GlobalPosition::start()).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.republished, 2);
    assert_eq!(bus.published().await, appended.envelopes);
}

#[tokio::test]
async fn sweep_over_delivers_rather_than_loses() {
    let store = InMemoryEventStore::new();
    let bus = InMemoryMessageBus::new();
    let bridge = PublisherBridge::new(Arc::new(bus.clone())).with_policy(policy());
    let stream_id = StreamId::new();

    let appended = store
        .append_one(stream_id, Version::initial(), user_event("UserCreated", "John Doe"))
        .await
        .unwrap();
    bridge
        .publish_after_append(stream_id, &appended.envelopes)
        .await
        .unwrap();

    // A sweep from an older checkpoint sends the same envelope again.
    let reconciler = Reconciler::new(store, bridge);
    reconciler.sweep(GlobalPosition::start()).await.unwrap();

    let published = bus.published().await;
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].event_id(), published[1].event_id());
}

#[tokio::test]
async fn causal_metadata_reaches_the_bus() {
    let store = InMemoryEventStore::new();
    let bus = InMemoryMessageBus::new();
    let bridge = PublisherBridge::new(Arc::new(bus.clone())).with_policy(policy());

    let users = StreamId::new();
    let created = store
        .append_one(users, Version::initial(), user_event("UserCreated", "John Doe"))
        .await
        .unwrap();
    let inbound = &created.envelopes[0];

    let audit = StreamId::new();
    let reaction = NewEvent::new("Audit", "UserRegistrationNoted", serde_json::json!({}))
        .with_context(EventContext::caused_by(inbound));
    let noted = store
        .append_one(audit, Version::initial(), reaction)
        .await
        .unwrap();
    bridge
        .publish_after_append(audit, &noted.envelopes)
        .await
        .unwrap();

    let published = bus.published().await;
    let metadata = published[0].metadata();
    assert_eq!(metadata.correlation_id, inbound.metadata().correlation_id);
    assert_eq!(
        metadata.causation_id.map(|id| id.as_uuid()),
        Some(inbound.event_id().as_uuid())
    );
}
