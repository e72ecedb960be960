//! Criterion benchmark for the aperture-overlap fading integral, the
//! dominant cost of a simulation run (O(samples × resolution²)).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fso_core::fading::PointingFadingModel;
use fso_core::trace::DisplacementTrace;

fn wandering_trace(n_samples: usize) -> DisplacementTrace {
    let time: Vec<f64> = (0..n_samples).map(|i| i as f64 * 1e-4).collect();
    let x: Vec<f64> = (0..n_samples)
        .map(|i| 0.4e-3 * (i as f64 * 0.01).sin())
        .collect();
    let y: Vec<f64> = (0..n_samples)
        .map(|i| 0.4e-3 * (i as f64 * 0.013).cos())
        .collect();
    DisplacementTrace::from_samples(time, x, y).unwrap()
}

fn bench_fading_series(c: &mut Criterion) {
    let trace = wandering_trace(1000);
    let mut group = c.benchmark_group("fading_series");

    for resolution in [50usize, 100, 200] {
        let model = PointingFadingModel::new(1.0e-3, 2.0e-3, resolution).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &model,
            |b, model| {
                b.iter(|| model.fading_series(black_box(&trace)).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_single_capture(c: &mut Criterion) {
    let model = PointingFadingModel::new(1.0e-3, 2.0e-3, 100).unwrap();
    c.bench_function("capture_fraction", |b| {
        b.iter(|| model.capture_fraction(black_box(0.3e-3), black_box(-0.2e-3)));
    });
}

criterion_group!(benches, bench_fading_series, bench_single_capture);
criterion_main!(benches);
