//! Batcher benchmarks over 1k random objects.
//!
//! Remove+Add and Update leave the batcher in the same state; Update should
//! be the cheaper of the two.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessel_render::{Batcher, Canvas, MergeOptions, NullCanvas, batch_with};
use tessel_test_utils::fixtures::{self, DEFAULT_SEED};

fn bench_remove_add_vs_update(c: &mut Criterion) {
    let objects = fixtures::n_rand_objects(1000, DEFAULT_SEED);
    let canvas = NullCanvas::new();
    let region = canvas.bounds();

    let mut group = c.benchmark_group("batcher_churn_1k");

    group.bench_function("remove_add", |b| {
        let batcher = Batcher::from_objects(&objects);
        let mut i = 0;
        b.iter(|| {
            batcher.draw_to(&canvas, region, None);
            let obj = std::slice::from_ref(&objects[i % objects.len()]);
            batcher.remove(obj);
            batcher.add(obj);
            i += 1;
        });
    });

    group.bench_function("update", |b| {
        let batcher = Batcher::from_objects(&objects);
        let mut i = 0;
        b.iter(|| {
            batcher.draw_to(&canvas, region, None);
            batcher.update(std::slice::from_ref(&objects[i % objects.len()]));
            i += 1;
        });
    });

    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("batcher_draw");
    let canvas = NullCanvas::new();
    let region = canvas.bounds();

    for size in [100, 1000, 10000] {
        let objects = fixtures::n_rand_objects(size, DEFAULT_SEED);
        let batcher = Batcher::from_objects(&objects);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("clean", size), &size, |b, _| {
            batcher.draw_to(&canvas, region, None);
            b.iter(|| batcher.draw_to(black_box(&canvas), region, None));
        });

        group.bench_with_input(BenchmarkId::new("rebuild_dirty", size), &size, |b, _| {
            b.iter(|| {
                batcher.update(&objects[..2]);
                batcher.draw_to(black_box(&canvas), region, None);
            });
        });
    }

    group.finish();
}

fn bench_direct_merge(c: &mut Criterion) {
    let objects: Vec<_> = fixtures::n_rand_objects(1000, DEFAULT_SEED)
        .into_iter()
        .filter(fixtures::is_similar)
        .collect();

    c.bench_function("batch_similar_objects", |b| {
        b.iter(|| batch_with(black_box(&objects), MergeOptions::default()))
    });
}

criterion_group!(benches, bench_remove_add_vs_update, bench_draw, bench_direct_merge);
criterion_main!(benches);
