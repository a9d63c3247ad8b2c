use chrono::{DateTime, Duration, TimeZone, Utc};
use liverun::config::TrackingSettings;
use liverun::import::ImportManager;
use liverun::{
    estimate_calories, GpsSample, ReplayLocationService, RunnerProfile, SpeedBand,
    SpeedBandSegmenter, UpdateResult, WorkoutMetricsEngine, WorkoutSession,
};
use std::io::Write;

// Integration tests that exercise complete workout flows

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 14, 6, 45, 0).unwrap()
}

/// Out-and-back along a meridian: a slow warmup, a fast stretch, then a cooldown
fn interval_run() -> Vec<GpsSample> {
    let mut samples = Vec::new();
    let mut latitude = 48.8566;
    let mut t = start_time();
    let legs = [(20, 2.2), (20, 4.5), (20, 2.0)];
    for (count, speed) in legs {
        for _ in 0..count {
            samples.push(GpsSample::new(latitude, 2.3522, t).with_speed(speed));
            // 1 s at `speed` m/s, expressed in degrees of latitude
            latitude += speed / 111_194.93;
            t += Duration::seconds(1);
        }
    }
    samples
}

fn write_gpx(samples: &[GpsSample]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".gpx").tempfile().unwrap();
    writeln!(
        file,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="liverun-tests" xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg>"#
    )
    .unwrap();
    for s in samples {
        writeln!(
            file,
            r#"<trkpt lat="{}" lon="{}"><time>{}</time></trkpt>"#,
            s.latitude,
            s.longitude,
            s.timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        )
        .unwrap();
    }
    writeln!(file, "</trkseg></trk></gpx>").unwrap();
    file
}

#[test]
fn test_live_session_matches_direct_engine() {
    let samples = interval_run();
    let settings = TrackingSettings {
        countdown_seconds: 0,
        ..TrackingSettings::default()
    };

    let mut session = WorkoutSession::new(
        RunnerProfile::default(),
        &settings,
        ReplayLocationService::new(samples.clone()),
    );
    session.start(start_time()).unwrap();
    for s in &samples {
        session.tick(s.timestamp);
    }
    let last = samples.last().unwrap().timestamp;
    let summary = session.finish(last).unwrap();

    let mut engine = WorkoutMetricsEngine::default();
    for s in samples {
        assert!(engine.accept_sample(s).is_accepted());
    }
    engine.set_running_time(std::time::Duration::from_secs(59));

    assert_eq!(summary.track.as_slice(), engine.track());
    assert!((summary.metrics.total_distance_miles - engine.metrics().total_distance_miles).abs() < 1e-12);
    assert!((summary.metrics.calories_burned - engine.metrics().calories_burned).abs() < 1e-12);
    assert!((summary.metrics.average_pace_min_per_mile - engine.metrics().average_pace_min_per_mile).abs() < 1e-9);
    assert_eq!(summary.metrics.running_time, std::time::Duration::from_secs(59));
}

#[test]
fn test_interval_run_totals() {
    let samples = interval_run();
    let mut engine = WorkoutMetricsEngine::default();
    for s in samples.clone() {
        engine.accept_sample(s);
    }

    // Each step covers the previous sample's speed for one second
    let meters: f64 = samples[..samples.len() - 1].iter().map(|s| s.speed_mps()).sum();
    let miles = meters / 1609.344;
    assert!((engine.metrics().total_distance_miles - miles).abs() < 1e-4);

    let calories: f64 = samples[1..]
        .iter()
        .map(|s| estimate_calories(153.0, "m", 29.0, 60.0, 1.0, s.speed_mps()))
        .sum();
    assert!((engine.metrics().calories_burned - calories).abs() < 1e-9);
}

#[test]
fn test_interval_run_segments() {
    let segments = SpeedBandSegmenter::segment(&interval_run());
    let bands: Vec<_> = segments.iter().map(|s| s.band).collect();

    // The warmup is the whole observed range and the fast leg tops it, so both
    // stay in the top band; the cooldown sets a new minimum
    assert_eq!(bands, vec![SpeedBand::Fastest, SpeedBand::Slowest]);
    assert_eq!(segments[0].points.len(), 40);
    assert_eq!(segments[1].points.len(), 20);
}

#[test]
fn test_gpx_replay_with_derived_speed() {
    let samples = interval_run();
    let file = write_gpx(&samples);

    let imported = ImportManager::with_derived_speed(true)
        .import_file(file.path())
        .unwrap();
    assert_eq!(imported.len(), samples.len());

    let mut engine = WorkoutMetricsEngine::default();
    let accepted = imported
        .into_iter()
        .map(|s| engine.accept_sample(s))
        .filter(UpdateResult::is_accepted)
        .count();
    assert_eq!(accepted, samples.len());

    // Derived speed covers the step from the previous fix, the first of the fast leg
    let fast = &engine.track()[21];
    assert!((fast.speed_mps() - 4.5).abs() < 0.05, "speed {}", fast.speed_mps());
}

#[test]
fn test_stationary_jitter_is_suppressed_in_session() {
    let t0 = start_time();
    let mut samples = vec![GpsSample::new(35.6762, 139.6503, t0)];
    for i in 1..30 {
        // ~11 cm wobble around the start
        let wobble = if i % 2 == 0 { 0.000001 } else { -0.000001 };
        samples.push(GpsSample::new(35.6762 + wobble, 139.6503, t0 + Duration::seconds(i)));
    }

    let settings = TrackingSettings {
        countdown_seconds: 0,
        ..TrackingSettings::default()
    };
    let mut session = WorkoutSession::new(
        RunnerProfile::default(),
        &settings,
        ReplayLocationService::new(samples.clone()),
    );
    session.start(t0).unwrap();
    for s in &samples {
        session.tick(s.timestamp);
    }
    let summary = session.finish(t0 + Duration::seconds(30)).unwrap();

    assert_eq!(summary.track.len(), 1);
    assert_eq!(summary.metrics.total_distance_miles, 0.0);
    assert_eq!(summary.metrics.calories_burned, 0.0);
    assert!(summary.segments.is_empty());
}
