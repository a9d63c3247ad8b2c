//! Incremental workout metrics from a live GPS sample stream

use std::time::Duration;
use tracing::{debug, info, trace};

use crate::calories::CalorieModel;
use crate::geo::distance_between_samples_miles;
use crate::models::{
    GpsSample, IgnoreReason, RunnerProfile, UpdateResult, WorkoutMetrics, WorkoutTrack,
};

/// Samples closer than this to the previous one are GPS jitter
pub const DEFAULT_MOVEMENT_THRESHOLD_MILES: f64 = 0.0001;

/// Stateful accumulator for one workout.
///
/// Feed samples in chronological order through [`accept_sample`](Self::accept_sample);
/// the running time comes from an external clock via
/// [`set_running_time`](Self::set_running_time). All mutation goes through
/// `&mut self`, so concurrent producers must serialize access themselves.
#[derive(Debug, Clone)]
pub struct WorkoutMetricsEngine {
    calories: CalorieModel,
    movement_threshold_miles: f64,
    track: WorkoutTrack,
    metrics: WorkoutMetrics,
}

impl WorkoutMetricsEngine {
    pub fn new(profile: RunnerProfile) -> Self {
        Self {
            calories: CalorieModel::new(profile),
            movement_threshold_miles: DEFAULT_MOVEMENT_THRESHOLD_MILES,
            track: Vec::new(),
            metrics: WorkoutMetrics::default(),
        }
    }

    pub fn with_movement_threshold(mut self, miles: f64) -> Self {
        self.movement_threshold_miles = miles;
        self
    }

    pub fn profile(&self) -> &RunnerProfile {
        self.calories.profile()
    }

    pub fn movement_threshold_miles(&self) -> f64 {
        self.movement_threshold_miles
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        &self.metrics
    }

    pub fn track(&self) -> &[GpsSample] {
        &self.track
    }

    /// Last accepted sample, the reference point for the next one
    pub fn previous_sample(&self) -> Option<&GpsSample> {
        self.track.last()
    }

    /// Record the externally timed running time and refresh pace and speed
    pub fn set_running_time(&mut self, running_time: Duration) {
        self.metrics.running_time = running_time;
        self.recompute_averages();
    }

    /// Feed one GPS fix.
    ///
    /// Returns [`UpdateResult::Ignored`] for jitter and unusable coordinates;
    /// otherwise the sample joins the track and the updated totals are returned.
    /// A sample timestamped at or before the previous one is kept but counts as
    /// a zero-length step.
    pub fn accept_sample(&mut self, sample: GpsSample) -> UpdateResult {
        if !sample.has_valid_fix() {
            debug!(
                latitude = sample.latitude,
                longitude = sample.longitude,
                "Ignoring sample with invalid fix"
            );
            return UpdateResult::Ignored(IgnoreReason::InvalidFix);
        }

        if let Some(previous) = self.track.last() {
            let step_miles = distance_between_samples_miles(previous, &sample);
            if step_miles < self.movement_threshold_miles {
                debug!(step_miles, "Ignoring insignificant movement");
                return UpdateResult::Ignored(IgnoreReason::InsignificantMovement);
            }

            let elapsed_seconds =
                ((sample.timestamp - previous.timestamp).num_milliseconds() as f64 / 1000.0).max(0.0);

            if elapsed_seconds > 0.0 {
                let step_calories = self.calories.estimate(elapsed_seconds, sample.speed_mps());
                self.metrics.total_distance_miles += step_miles;
                self.metrics.calories_burned += step_calories;
                trace!(step_miles, elapsed_seconds, step_calories, "Accepted step");
            } else {
                debug!(
                    previous = %previous.timestamp,
                    current = %sample.timestamp,
                    "Non-positive interval, counting as zero-length step"
                );
            }

            self.recompute_averages();
        }

        self.track.push(sample);
        UpdateResult::Accepted(self.metrics.clone())
    }

    /// Start over for a new workout, keeping profile and threshold
    pub fn reset(&mut self) {
        info!(
            samples = self.track.len(),
            miles = self.metrics.total_distance_miles,
            "Resetting workout metrics"
        );
        self.track.clear();
        self.metrics = WorkoutMetrics::default();
    }

    /// Hand the track and final totals to the caller, leaving the engine reset
    pub fn finish(&mut self) -> (WorkoutTrack, WorkoutMetrics) {
        let track = std::mem::take(&mut self.track);
        let metrics = std::mem::take(&mut self.metrics);
        (track, metrics)
    }

    fn recompute_averages(&mut self) {
        let miles = self.metrics.total_distance_miles;
        if miles <= 0.0 {
            return;
        }

        let minutes = self.metrics.running_time.as_secs_f64() / 60.0;
        self.metrics.average_pace_min_per_mile = minutes / miles;

        let hours = minutes / 60.0;
        if hours > 0.0 {
            self.metrics.average_speed_mph = miles / hours;
        }
    }
}

impl Default for WorkoutMetricsEngine {
    fn default() -> Self {
        Self::new(RunnerProfile::default())
    }
}
