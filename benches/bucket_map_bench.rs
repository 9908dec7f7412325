use bucket_map::{BucketMap, NaturalOrder, StringHash};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

/// Deterministic pseudo-random stream.
fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

/// Inserted keys. Lookups that must miss use `absent`, whose prefix no
/// inserted key shares.
fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn absent(n: u64) -> String {
    format!("m{:016x}", n)
}

fn filled(seed: u64, n: usize) -> BucketMap<String, u64> {
    let mut m = BucketMap::new();
    for (i, x) in lcg(seed).take(n).enumerate() {
        m.insert(key(x), i as u64).unwrap();
    }
    m
}

fn bench_insert_10k(c: &mut Criterion) {
    c.bench_function("bucket_map_insert_10k", |b| {
        b.iter_batched(
            BucketMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_djb2_10k(c: &mut Criterion) {
    c.bench_function("bucket_map_insert_djb2_10k", |b| {
        b.iter_batched(
            || BucketMap::<String, u64, _, _>::with_comparator_and_hasher(NaturalOrder, StringHash),
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit(c: &mut Criterion) {
    c.bench_function("bucket_map_find_hit", |b| {
        let m = filled(7, 20_000);
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.find(k.as_str()));
        })
    });
}

fn bench_find_miss(c: &mut Criterion) {
    c.bench_function("bucket_map_find_miss", |b| {
        let m = filled(11, 10_000);
        let misses: Vec<_> = lcg(11).take(10_000).map(absent).collect();
        let mut it = misses.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.find(k.as_str()));
        })
    });
}

fn bench_walk_10k(c: &mut Criterion) {
    c.bench_function("bucket_map_cursor_walk_10k", |b| {
        let m = filled(13, 10_000);
        b.iter(|| {
            let mut sum = 0u64;
            let mut cur = m.first();
            while let Some(c) = cur {
                sum = sum.wrapping_add(*c.value(&m).unwrap());
                cur = m.next(c).unwrap();
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(40)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_10k, bench_insert_djb2_10k, bench_find_hit, bench_find_miss, bench_walk_10k
}
criterion_main!(benches);
