use criterion::{Criterion, criterion_group, criterion_main};
use saga_store::{
    CorrelationId, InMemorySagaStore, InstanceRecord, PutOptions, SagaStore, Version,
};

fn make_record(correlation_id: CorrelationId, version: i64) -> InstanceRecord {
    InstanceRecord::new(
        correlation_id,
        Version::new(version),
        serde_json::json!({
            "correlationId": correlation_id.to_string(),
            "state": "GuestCreating",
            "userCreated": true,
            "guestCreated": false,
            "retryCount": 0
        }),
    )
}

fn bench_put_new_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga_store/put_new_record", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemorySagaStore::new();
                let cid = CorrelationId::new();
                store
                    .put(make_record(cid, 1), PutOptions::expect_new())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_read_transition_write_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga_store/read_transition_write_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemorySagaStore::new();
                let cid = CorrelationId::new();
                store
                    .put(make_record(cid, 1), PutOptions::expect_new())
                    .await
                    .unwrap();

                let current = store.get(cid).await.unwrap().unwrap();
                store
                    .put(
                        make_record(cid, 2),
                        PutOptions::expect_version(current.version),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_get_existing(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga_store/get_existing", |b| {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();
        rt.block_on(async {
            store
                .put(make_record(cid, 1), PutOptions::expect_new())
                .await
                .unwrap();
        });

        b.iter(|| {
            rt.block_on(async {
                store.get(cid).await.unwrap().unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_put_new_record,
    bench_read_transition_write_cycle,
    bench_get_existing
);
criterion_main!(benches);
