use biopeaks::detect::filter;
use biopeaks::kernel::KernelLifecycle;
use biopeaks::signal::spectral::welch;
use biopeaks::{detect, DetectConfig, Detector};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FS: f64 = 250.0;

/// One minute of Gaussian beats at 75 bpm over a slow baseline wander.
fn pulse_train() -> Vec<f64> {
    let n = (60.0 * FS) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / FS;
            let phase = (t * 1.25).fract() - 0.5;
            let beat = 10.0 * (-phase * phase / 0.0005).exp();
            beat + 0.5 * (2.0 * std::f64::consts::PI * 0.3 * t).sin()
        })
        .collect()
}

///
/// Full pipeline on one minute of 250 Hz ECG-like input.
///
fn detect_one_minute(c: &mut Criterion) {
    let x = pulse_train();
    let config = DetectConfig::default();
    c.bench_function("detect_60s", |b| {
        b.iter(|| {
            black_box(
                detect(black_box(&x), FS, &config)
                    .expect("benchmark input should yield peaks"),
            );
        });
    });

    let detector = Detector::try_new(config).expect("valid config");
    c.bench_function("detector_run_60s", |b| {
        b.iter(|| {
            black_box(
                detector
                    .run(black_box(&x), FS)
                    .expect("benchmark input should yield peaks"),
            );
        });
    });
}

fn preprocess_one_minute(c: &mut Criterion) {
    let x = pulse_train();
    c.bench_function("filter_60s", |b| {
        b.iter(|| {
            black_box(filter(black_box(&x), 1.0, 100.0, FS).expect("valid band"));
        });
    });
}

fn welch_one_minute(c: &mut Criterion) {
    let squared: Vec<f64> = pulse_train().iter().map(|v| v * v).collect();
    c.bench_function("welch_60s", |b| {
        b.iter(|| {
            black_box(welch(black_box(&squared), FS, squared.len()).expect("valid segment"));
        });
    });
}

criterion_group!(
    benches,
    detect_one_minute,
    preprocess_one_minute,
    welch_one_minute
);
criterion_main!(benches);
