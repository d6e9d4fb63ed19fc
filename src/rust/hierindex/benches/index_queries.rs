use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hierindex::{HierarchicalIndex, IndexConfig, Key, Record};

/// A random forest where each record points at an earlier one, or at
/// nothing with probability `1 / roots_every`.
fn generate_forest(size: usize, roots_every: usize) -> Vec<Record> {
    let mut records = Vec::with_capacity(size);
    for i in 0..size {
        let parent = if i == 0 || fastrand::usize(0..roots_every) == 0 {
            None
        } else {
            Some(Key::from(fastrand::usize(0..i) as u64))
        };
        records.push(Record::new(i as u64, parent));
    }
    fastrand::shuffle(&mut records);
    records
}

/// A single chain 0 <- 1 <- 2 ... for worst-case ancestor depth.
fn generate_chain(size: usize) -> Vec<Record> {
    (0..size as u64)
        .map(|i| Record::new(i, i.checked_sub(1).map(Key::from)))
        .collect()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    for size in [1_000, 10_000, 100_000] {
        let records = generate_forest(size, 20);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let config = IndexConfig::new().with_capacity(records.len());
                black_box(HierarchicalIndex::from_records_with(config, records.clone()))
            })
        });
    }
    group.finish();
}

fn bench_descendants(c: &mut Criterion) {
    let records = generate_forest(50_000, 50);
    let cached = HierarchicalIndex::from_records(records.clone());
    let plain = HierarchicalIndex::from_records_with(IndexConfig::new().memoize(false), records);
    let roots: Vec<Key> = plain.roots().iter().map(|r| r.id.clone()).take(64).collect();

    let mut group = c.benchmark_group("descendants");
    group.bench_function("memoized", |b| {
        b.iter(|| {
            for root in &roots {
                black_box(cached.get_all_descendants(root));
            }
        })
    });
    group.bench_function("uncached", |b| {
        b.iter(|| {
            for root in &roots {
                black_box(plain.get_all_descendants(root));
            }
        })
    });
    group.finish();
}

fn bench_ancestors(c: &mut Criterion) {
    let size = 10_000;
    let cached = HierarchicalIndex::from_records(generate_chain(size));
    let plain =
        HierarchicalIndex::from_records_with(IndexConfig::new().memoize(false), generate_chain(size));
    let deepest = Key::from((size - 1) as u64);

    let mut group = c.benchmark_group("ancestors_of_deepest");
    group.bench_function("memoized", |b| {
        b.iter(|| black_box(cached.get_all_ancestors(&deepest)))
    });
    group.bench_function("uncached", |b| {
        b.iter(|| black_box(plain.get_all_ancestors(&deepest)))
    });
    group.finish();
}

criterion_group!(benches, bench_construction, bench_descendants, bench_ancestors);
criterion_main!(benches);
