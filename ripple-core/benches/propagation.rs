//! Benchmarks for ripple-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ripple_core::{computed, effect, signal};

fn bench_signal_get(c: &mut Criterion) {
    let s = signal(42i32);
    c.bench_function("signal_get", |b| b.iter(|| black_box(s.get())));
}

fn bench_signal_set_same_value(c: &mut Criterion) {
    let s = signal(42i32);
    c.bench_function("signal_set_same_value", |b| b.iter(|| s.set(black_box(42))));
}

fn bench_computed_cached_read(c: &mut Criterion) {
    let s = signal(1i32);
    let s_clone = s.clone();
    let doubled = computed(move || s_clone.get() * 2);
    doubled.get();

    c.bench_function("computed_cached_read", |b| b.iter(|| black_box(doubled.get())));
}

fn bench_computed_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("computed_chain");

    for depth in [1usize, 10, 100] {
        let source = signal(0i64);
        let first = {
            let source = source.clone();
            computed(move || source.get() + 1)
        };
        let mut last = first;
        for _ in 1..depth {
            let prev = last.clone();
            last = computed(move || prev.get() + 1);
        }
        last.get();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let mut value = 0i64;
            b.iter(|| {
                value += 1;
                source.set(value);
                black_box(last.get())
            })
        });
    }

    group.finish();
}

fn bench_effect_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("effect_fanout");

    for width in [1usize, 10, 100] {
        let source = signal(0i64);
        for _ in 0..width {
            let source = source.clone();
            effect(move || {
                black_box(source.get());
            });
        }

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            let mut value = 0i64;
            b.iter(|| {
                value += 1;
                source.set(value)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_signal_get,
    bench_signal_set_same_value,
    bench_computed_cached_read,
    bench_computed_chain,
    bench_effect_fanout,
);
criterion_main!(benches);
