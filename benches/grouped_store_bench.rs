use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use grouped_metadata::GroupedMetadataStore;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn pair(n: u64) -> (String, String) {
    (format!("g{:02}", n % 32), format!("k{:016x}", n))
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("grouped_store_add_10k", |b| {
        b.iter_batched(
            GroupedMetadataStore::<u64>::new,
            |s| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    let (g, k) = pair(x);
                    s.add(&g, &k, i as u64).unwrap();
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("grouped_store_get_hit", |b| {
        let s = GroupedMetadataStore::new();
        let pairs: Vec<_> = lcg(7).take(20_000).map(pair).collect();
        for (i, (g, k)) in pairs.iter().enumerate() {
            s.add(g, k, i as u64).unwrap();
        }
        let mut it = pairs.iter().cycle();
        b.iter(|| {
            let (g, k) = it.next().unwrap();
            black_box(s.get(g, k).unwrap());
        })
    });
}

fn bench_try_get_miss(c: &mut Criterion) {
    c.bench_function("grouped_store_try_get_miss", |b| {
        let s = GroupedMetadataStore::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            let (g, k) = pair(x);
            s.add(&g, &k, i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let (g, k) = pair(miss.next().unwrap());
            black_box(s.try_get(&g, &k));
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    c.bench_function("grouped_store_snapshot_10k", |b| {
        let s = GroupedMetadataStore::new();
        for (i, x) in lcg(3).take(10_000).enumerate() {
            let (g, k) = pair(x);
            s.add(&g, &k, i as u64).unwrap();
        }
        b.iter(|| black_box(s.snapshot().count()))
    });
}

fn bench_contended_set(c: &mut Criterion) {
    c.bench_function("grouped_store_set_4_threads", |b| {
        let s = Arc::new(GroupedMetadataStore::new());
        b.iter(|| {
            let workers: Vec<_> = (0..4u64)
                .map(|t| {
                    let s = s.clone();
                    thread::spawn(move || {
                        for x in lcg(t).take(1_000) {
                            let (g, k) = pair(x);
                            s.set(&g, &k, x).unwrap();
                        }
                    })
                })
                .collect();
            for w in workers {
                w.join().unwrap();
            }
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_add, bench_get_hit, bench_try_get_miss, bench_snapshot, bench_contended_set
}
criterion_main!(benches);
