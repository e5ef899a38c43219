use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{
    EventStore, EventStoreExt, GlobalPosition, InMemoryEventStore, NewEvent, StreamId, Version,
};

fn make_event() -> NewEvent {
    NewEvent::new(
        "User",
        "UserNameUpdated",
        serde_json::json!({
            "user_id": "00000000-0000-0000-0000-000000000001",
            "user_name": "Adam Smith"
        }),
    )
}

fn populated_store(rt: &tokio::runtime::Runtime, streams: usize, per_stream: usize) -> (InMemoryEventStore, StreamId) {
    let store = InMemoryEventStore::new();
    let mut last = StreamId::new();

    rt.block_on(async {
        for _ in 0..streams {
            last = StreamId::new();
            let events: Vec<NewEvent> = (0..per_stream).map(|_| make_event()).collect();
            store.append(last, Version::initial(), events).await.unwrap();
        }
    });

    (store, last)
}

fn bench_append_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_single_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                store
                    .append_one(StreamId::new(), Version::initial(), make_event())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_batch_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let events: Vec<NewEvent> = (0..10).map(|_| make_event()).collect();
                store
                    .append(StreamId::new(), Version::initial(), events)
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_to_existing_stream(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let stream_id = StreamId::new();
    let mut version = Version::initial();

    c.bench_function("event_store/append_to_existing_stream", |b| {
        b.iter(|| {
            version = rt.block_on(async {
                store
                    .append_one(stream_id, version, make_event())
                    .await
                    .unwrap()
                    .version
            });
        });
    });
}

fn bench_read_stream_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, stream_id) = populated_store(&rt, 1, 100);

    c.bench_function("event_store/read_stream_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.read_stream(stream_id).await.unwrap();
            });
        });
    });
}

fn bench_read_from_version_50(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, stream_id) = populated_store(&rt, 1, 100);

    c.bench_function("event_store/read_from_version_50", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.read(stream_id, Version::new(50)).await.unwrap();
            });
        });
    });
}

fn bench_read_all_1000(c: &mut Criterion) {
    use futures_util::StreamExt;

    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, _) = populated_store(&rt, 10, 100);

    c.bench_function("event_store/read_all_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut stream = store.read_all(GlobalPosition::start()).await.unwrap();
                let mut count = 0;
                while let Some(result) = stream.next().await {
                    result.unwrap();
                    count += 1;
                }
                assert_eq!(count, 1000);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_event,
    bench_append_batch_10,
    bench_append_to_existing_stream,
    bench_read_stream_100,
    bench_read_from_version_50,
    bench_read_all_1000,
);
criterion_main!(benches);
