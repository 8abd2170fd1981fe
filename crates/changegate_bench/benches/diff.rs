//! Change detection benchmarks.

use changegate_bench::{nested_chain, record_list, ring, wide_tree};
use changegate_core::{first_difference, has_changed, Value};
use changegate_testkit::{case_form, leaf_paths, replace_at, reversed_keys};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark comparing equal values, the common case for an untouched form.
fn bench_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("unchanged");

    group.bench_function("case_form", |b| {
        let old = case_form();
        let new = case_form();
        b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
    });

    group.bench_function("case_form_reordered", |b| {
        let old = case_form();
        let new = reversed_keys(&old);
        b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
    });

    group.bench_function("tree_depth3_width5", |b| {
        let old = wide_tree(3, 5);
        let new = wide_tree(3, 5);
        b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
    });

    group.finish();
}

/// Benchmark with varying sequence lengths.
fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");

    for len in [16, 128, 1024].iter() {
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, &len| {
            let old = record_list(len);
            let new = record_list(len);
            b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
        });
    }

    group.finish();
}

/// Benchmark early exit when the last or first leaf changed.
fn bench_changed(c: &mut Criterion) {
    let mut group = c.benchmark_group("changed");

    let old = record_list(1024);
    let paths = leaf_paths(&old);

    if let (Some(first), Some(last)) = (paths.first(), paths.last()) {
        let early = replace_at(&old, first, Value::from(-1));
        let late = replace_at(&old, last, Value::from("edited"));

        group.bench_function("first_leaf", |b| {
            b.iter(|| black_box(first_difference(black_box(&old), black_box(&early))));
        });
        group.bench_function("last_leaf", |b| {
            b.iter(|| black_box(first_difference(black_box(&old), black_box(&late))));
        });
    }

    group.finish();
}

/// Benchmark cyclic and deeply nested inputs.
fn bench_graphs(c: &mut Criterion) {
    let mut group = c.benchmark_group("graphs");

    for len in [8, 64, 512].iter() {
        group.bench_with_input(BenchmarkId::new("ring", len), len, |b, &len| {
            let old = ring(len);
            let new = ring(len);
            b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
        });
    }

    group.bench_function("chain_depth_256", |b| {
        let old = nested_chain(256);
        let new = nested_chain(256);
        b.iter(|| black_box(has_changed(black_box(&old), black_box(&new))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_unchanged,
    bench_records,
    bench_changed,
    bench_graphs,
);

criterion_main!(benches);
