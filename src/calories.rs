//! Calorie estimation from speed-based MET values and the Mifflin-St Jeor BMR
//!
//! Energy for an interval is the runner's basal rate (kcal per 1000 minutes of
//! rest, scaled by MET) multiplied by the interval length in minutes:
//!
//! - female: `((9.99 * kg) + (6.25 * cm) - (4.92 * age) - 161) / 1000 * MET`
//! - male:   `((9.99 * kg) + (6.25 * cm) - (4.92 * age) + 5) / 1000 * MET`

use crate::geo::MPS_TO_MPH;
use crate::models::{Gender, RunnerProfile, SpeedMetEntry};

/// MET used when the speed is below the first table threshold
pub const DEFAULT_MET: f64 = 6.0;

const fn entry(speed_threshold_mph: f64, met_value: f64, description: &'static str) -> SpeedMetEntry {
    SpeedMetEntry {
        speed_threshold_mph,
        met_value,
        description,
    }
}

/// Speed to MET table, ascending by speed threshold
pub static SPEED_MET_TABLE: [SpeedMetEntry; 16] = [
    entry(2.0, 2.0, "Very slow walk"),
    entry(2.5, 2.8, "Slow walk"),
    entry(3.0, 3.0, "Normal walk"),
    entry(3.5, 3.5, "Brisk walk"),
    entry(4.0, 8.0, "Very brisk walk or light jog"),
    entry(4.5, 8.3, "Jogging"),
    entry(5.0, 9.0, "Steady jogging"),
    entry(5.5, 9.8, "Faster jogging"),
    entry(6.0, 10.5, "Moderate run"),
    entry(6.7, 11.0, "Brisk run"),
    entry(7.5, 11.8, "Fast run"),
    entry(8.5, 12.8, "Very fast run"),
    entry(9.5, 14.5, "Hard effort run"),
    entry(10.5, 16.0, "Intense run"),
    entry(12.0, 19.0, "Very intense run"),
    entry(14.0, 23.0, "Sprint effort"),
];

/// Table row with the greatest threshold not above `speed_mph`
pub fn matching_entry(speed_mph: f64) -> Option<&'static SpeedMetEntry> {
    SPEED_MET_TABLE
        .iter()
        .rev()
        .find(|row| row.speed_threshold_mph <= speed_mph)
}

/// MET for a speed in mph, falling back to [`DEFAULT_MET`]
pub fn lookup_met(speed_mph: f64) -> f64 {
    matching_entry(speed_mph)
        .map(|row| row.met_value)
        .unwrap_or(DEFAULT_MET)
}

/// Calories burned over `interval_seconds` at `speed_mps`.
///
/// `gender_code` of "f" or "female" selects the female constant; every other
/// code uses the male one. Negative intervals count as zero.
pub fn estimate_calories(
    height_cm: f64,
    gender_code: &str,
    age_years: f64,
    weight_kg: f64,
    interval_seconds: f64,
    speed_mps: f64,
) -> f64 {
    let speed_mph = speed_mps * MPS_TO_MPH;
    let met = lookup_met(speed_mph);

    let gender_constant = match Gender::from_code(gender_code) {
        Gender::Female => -161.0,
        Gender::Male => 5.0,
    };
    let mut rate =
        ((9.99 * weight_kg) + (6.25 * height_cm) - (4.92 * age_years) + gender_constant) / 1000.0 * met;

    rate *= interval_seconds.max(0.0) / 60.0;
    rate
}

/// Calorie estimator bound to one runner
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieModel {
    profile: RunnerProfile,
}

impl CalorieModel {
    pub fn new(profile: RunnerProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &RunnerProfile {
        &self.profile
    }

    pub fn estimate(&self, interval_seconds: f64, speed_mps: f64) -> f64 {
        estimate_calories(
            self.profile.height_cm,
            self.profile.gender.code(),
            self.profile.age_years,
            self.profile.weight_kg,
            interval_seconds,
            speed_mps,
        )
    }
}

impl Default for CalorieModel {
    fn default() -> Self {
        Self::new(RunnerProfile::default())
    }
}
