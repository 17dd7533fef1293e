//! Performance benchmarks for satchel-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use satchel_engine::{build_archive, restore_archive, MemoryStore, RecordStore, SourceContext};
use serde_json::json;

fn seeded_store(records: u64) -> MemoryStore {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let store = MemoryStore::new();
    store.register_type("Customer", "Selling", json!({"name": "Customer"}));

    rt.block_on(async {
        for i in 0..records {
            store
                .insert_record(
                    "Customer",
                    &format!("CUST-{i:06}"),
                    json!({"name": format!("CUST-{i:06}"), "territory": "EU", "credit_limit": i}),
                )
                .await
                .expect("seed record");
        }
    });
    store
}

fn bench_build_archive(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("build_archive");

    for records in [100u64, 1_000] {
        let store = seeded_store(records);
        let ctx = SourceContext::new("bench.example", "bench");
        let selection = vec!["Customer".to_string()];

        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| {
                rt.block_on(build_archive(
                    black_box(&store),
                    black_box(&selection),
                    black_box(&ctx),
                ))
                .expect("build")
            })
        });
    }

    group.finish();
}

fn bench_restore_archive(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("restore_archive");

    for records in [100u64, 1_000] {
        let store = seeded_store(records);
        let ctx = SourceContext::new("bench.example", "bench");
        let selection = vec!["Customer".to_string()];
        let artifact = rt
            .block_on(build_archive(&store, &selection, &ctx))
            .expect("build");

        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| {
                let target = MemoryStore::new();
                rt.block_on(restore_archive(
                    black_box(&target),
                    black_box(&artifact.bytes),
                    false,
                ))
                .expect("restore")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_archive, bench_restore_archive);
criterion_main!(benches);
