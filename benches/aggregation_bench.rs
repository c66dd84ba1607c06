use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use oometrics::{
    analyze_universe, AnalysisOptions, ClassDescriptor, FieldDescriptor, MethodDescriptor,
    Universe, Visibility,
};
use std::hint::black_box;

/// A 4-ary inheritance forest: class `i` extends class `(i - 1) / 4`.
/// Every class overrides `render` and declares a few members of its own.
fn create_universe(size: usize) -> Universe {
    (0..size)
        .map(|i| {
            let mut class = ClassDescriptor::new(format!("bench.pkg{}.C{i}", i % 8))
                .with_method(MethodDescriptor::new("render", Visibility::Public))
                .with_method(
                    MethodDescriptor::new(format!("own{i}"), Visibility::Protected)
                        .with_parameters(["int"]),
                )
                .with_method(MethodDescriptor::new(format!("helper{i}"), Visibility::Private))
                .with_field(FieldDescriptor::new(format!("state{i}"), "long", Visibility::Private))
                .with_field(FieldDescriptor::new(
                    format!("tag{i}"),
                    "java.lang.String",
                    Visibility::Public,
                ));
            if i > 0 {
                let parent = (i - 1) / 4;
                class = class.extends(format!("bench.pkg{}.C{parent}", parent % 8));
            }
            class
        })
        .collect()
}

fn benchmark_metrics_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics_pass");

    for size in [100, 1_000, 5_000] {
        let universe = create_universe(size);

        group.bench_with_input(BenchmarkId::new("sequential", size), &universe, |b, universe| {
            let options = AnalysisOptions {
                parallel: false,
                ..AnalysisOptions::default()
            };
            b.iter(|| black_box(analyze_universe(universe, &options)))
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &universe, |b, universe| {
            let options = AnalysisOptions::default();
            b.iter(|| black_box(analyze_universe(universe, &options)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_metrics_pass);
criterion_main!(benches);
