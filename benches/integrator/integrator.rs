use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sir_euler::integrator::{integrate, integrate_with_diagnostics};
use sir_euler::runner::simulate;
use sir_euler::scenarios::builtin_scenarios;
use std::hint::black_box;

static STEP_COUNTS: [usize; 3] = [200, 2_000, 20_000];

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    let scenarios = builtin_scenarios();
    // The late-intervention scenario exercises the rate switch.
    let scenario = &scenarios[2];
    for steps in STEP_COUNTS {
        let mut config = scenario.config;
        config.steps = steps;
        group.bench_with_input(BenchmarkId::from_parameter(steps), &config, |bencher, config| {
            bencher.iter_with_large_drop(|| integrate(black_box(config)).unwrap());
        });
    }
    group.finish();

    c.bench_function("integrate with diagnostics", |bencher| {
        let config = scenario.config;
        bencher.iter_with_large_drop(|| integrate_with_diagnostics(black_box(&config)).unwrap());
    });

    let mut group = c.benchmark_group("builtin scenarios");
    for parallel in [false, true] {
        group.bench_with_input(
            BenchmarkId::from_parameter(if parallel { "parallel" } else { "sequential" }),
            &parallel,
            |bencher, &parallel| {
                bencher.iter_with_large_drop(|| simulate(builtin_scenarios(), parallel).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
