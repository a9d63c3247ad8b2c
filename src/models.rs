use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::geo::MPS_TO_MPH;

/// One GPS fix as delivered by the location collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Ground speed in meters per second (None when the receiver did not report one)
    pub speed: Option<f64>,

    /// Altitude in meters
    pub altitude: Option<f64>,

    /// Time of the fix
    pub timestamp: DateTime<Utc>,
}

impl GpsSample {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            speed: None,
            altitude: None,
            timestamp,
        }
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed = Some(speed_mps);
        self
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude = Some(altitude_m);
        self
    }

    /// Reported speed, treating a missing value as standing still
    pub fn speed_mps(&self) -> f64 {
        self.speed.unwrap_or(0.0)
    }

    pub fn speed_mph(&self) -> f64 {
        self.speed_mps() * MPS_TO_MPH
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Whether the coordinates can be used for distance math at all
    pub fn has_valid_fix(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Chronologically ordered samples of one workout
pub type WorkoutTrack = Vec<GpsSample>;

/// Running totals for the active workout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutMetrics {
    /// Sum of great-circle distances between accepted samples
    pub total_distance_miles: f64,

    /// Running time divided by distance
    pub average_pace_min_per_mile: f64,

    /// Distance divided by running time
    pub average_speed_mph: f64,

    /// Estimated energy expenditure (kcal)
    pub calories_burned: f64,

    /// Time on the clock, excluding countdown and pauses
    #[serde(with = "duration_serde")]
    pub running_time: Duration,
}

/// Why a sample did not change the workout totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// Closer to the previous sample than the movement threshold
    InsignificantMovement,
    /// Non-finite or out-of-range coordinates
    InvalidFix,
}

/// Outcome of feeding one sample to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateResult {
    /// Sample appended to the track; carries the updated totals
    Accepted(WorkoutMetrics),
    /// Sample dropped; totals and track are unchanged
    Ignored(IgnoreReason),
}

impl UpdateResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, UpdateResult::Accepted(_))
    }

    pub fn metrics(&self) -> Option<&WorkoutMetrics> {
        match self {
            UpdateResult::Accepted(metrics) => Some(metrics),
            UpdateResult::Ignored(_) => None,
        }
    }
}

/// Row of the speed to MET lookup table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMetEntry {
    pub speed_threshold_mph: f64,
    pub met_value: f64,
    pub description: &'static str,
}

/// Speed bucket relative to the speeds observed so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedBand {
    Slowest = 1,
    Slow = 2,
    Fast = 3,
    Fastest = 4,
}

impl SpeedBand {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Polyline color used by map renderers
    pub fn color_hex(&self) -> &'static str {
        match self {
            SpeedBand::Slowest => "#61d52a",
            SpeedBand::Slow => "#feef0e",
            SpeedBand::Fast => "#ff9003",
            SpeedBand::Fastest => "#fc2123",
        }
    }
}

/// Contiguous run of track points sharing one speed band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedBandSegment {
    pub band: SpeedBand,
    pub points: Vec<GeoPoint>,
}

/// Biological sex used by the Mifflin-St Jeor constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Interpret a free-form gender code; anything but "f"/"female" is male
    pub fn from_code(code: &str) -> Self {
        match code {
            "f" | "female" => Gender::Female,
            _ => Gender::Male,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

/// Body measurements feeding the calorie model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
    /// Height in centimeters
    pub height_cm: f64,

    pub gender: Gender,

    /// Age in years
    pub age_years: f64,

    /// Weight in kilograms
    pub weight_kg: f64,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            height_cm: 153.0,
            gender: Gender::Male,
            age_years: 29.0,
            weight_kg: 60.0,
        }
    }
}

pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_speed_reads_as_zero() {
        let sample = GpsSample::new(40.0, -74.0, Utc::now());
        assert_eq!(sample.speed_mps(), 0.0);
        assert_eq!(sample.speed_mph(), 0.0);

        let sample = sample.with_speed(2.0);
        assert!((sample.speed_mph() - 4.47388).abs() < 1e-9);
    }

    #[test]
    fn test_fix_validation() {
        let now = Utc::now();
        assert!(GpsSample::new(51.5, -0.12, now).has_valid_fix());
        assert!(!GpsSample::new(f64::NAN, -0.12, now).has_valid_fix());
        assert!(!GpsSample::new(51.5, f64::INFINITY, now).has_valid_fix());
        assert!(!GpsSample::new(91.0, 0.0, now).has_valid_fix());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code("f"), Gender::Female);
        assert_eq!(Gender::from_code("female"), Gender::Female);
        assert_eq!(Gender::from_code("m"), Gender::Male);
        assert_eq!(Gender::from_code("F"), Gender::Male);
        assert_eq!(Gender::from_code(Gender::Female.code()), Gender::Female);
    }

    #[test]
    fn test_band_ids_and_colors() {
        assert_eq!(SpeedBand::Slowest.id(), 1);
        assert_eq!(SpeedBand::Fastest.id(), 4);
        assert_eq!(SpeedBand::Slow.color_hex(), "#feef0e");
    }

    #[test]
    fn test_metrics_serialize_running_time_as_millis() {
        let metrics = WorkoutMetrics {
            running_time: Duration::from_secs(90),
            ..Default::default()
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"running_time\":90000"));
        let back: WorkoutMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }
}
