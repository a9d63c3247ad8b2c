use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liverun::{estimate_calories, GpsSample, SpeedBandSegmenter, WorkoutMetricsEngine};

// Performance benchmarks for the live metrics path
//
// A phone delivers one fix per second, so even multi-hour tracks must stay
// well inside a frame budget when segmented for the detail map.

fn create_track(points: usize) -> Vec<GpsSample> {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    (0..points)
        .map(|i| {
            let speed = 2.0 + (i % 90) as f64 / 30.0;
            GpsSample::new(
                51.5007 + i as f64 * 0.00003,
                -0.1246 + (i as f64 / 50.0).sin() * 0.0002,
                t0 + Duration::seconds(i as i64),
            )
            .with_speed(speed)
        })
        .collect()
}

fn bench_accept_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Metrics Engine");

    for &size in &[60, 600, 3600, 14400] {
        let track = create_track(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("accept_sample", size), &track, |b, track| {
            b.iter(|| {
                let mut engine = WorkoutMetricsEngine::default();
                for sample in track {
                    black_box(engine.accept_sample(sample.clone()));
                }
            });
        });
    }

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Speed Bands");

    for &size in &[600, 3600, 14400] {
        let track = create_track(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("segment", size), &track, |b, track| {
            b.iter(|| black_box(SpeedBandSegmenter::segment(track)));
        });
    }

    group.finish();
}

fn bench_calories(c: &mut Criterion) {
    c.bench_function("estimate_calories", |b| {
        b.iter(|| {
            estimate_calories(
                black_box(153.0),
                black_box("m"),
                black_box(29.0),
                black_box(60.0),
                black_box(1.0),
                black_box(2.5),
            )
        })
    });
}

criterion_group!(benches, bench_accept_sample, bench_segmentation, bench_calories);
criterion_main!(benches);
