use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmm::SingleNodes;

fn bench_sum_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_table");

    group.bench_function("sum_update_1000_unique_keys", |b| {
        b.iter(|| {
            let mut table = SingleNodes::new();
            for i in 0..1000u32 {
                table.sum_update(black_box([i, i]), 1.0).unwrap();
            }
            table
        });
    });

    group.bench_function("sum_update_100_keys_repeated_10x", |b| {
        b.iter(|| {
            let mut table = SingleNodes::new();
            for _ in 0..10 {
                for i in 0..100u32 {
                    table.sum_update(black_box([i, i]), 1.0).unwrap();
                }
            }
            table
        });
    });

    let mut populated = SingleNodes::new();
    for i in 0..500u32 {
        populated.sum_update([i, i], 1.0).unwrap();
    }
    group.bench_function("enumerate_500_entries", |b| {
        b.iter(|| populated.enumerate().map(|(_, v)| v).sum::<f64>());
    });
}

criterion_group!(benches, bench_sum_update);
criterion_main!(benches);
