//! Text formatting of workout metrics for display collaborators

use serde::Serialize;
use std::time::Duration;

use crate::models::WorkoutMetrics;

/// Distance with two decimals, e.g. "3.17"
pub fn format_miles(miles: f64) -> String {
    format!("{:.2}", miles)
}

/// Pace as "mm:ss" (minutes within the hour, seconds truncated)
pub fn format_pace(minutes_per_mile: f64) -> String {
    if !minutes_per_mile.is_finite() || minutes_per_mile <= 0.0 {
        return "00:00".to_string();
    }
    let total_ms = (minutes_per_mile * 60_000.0).round() as u64;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

pub fn format_speed(mph: f64) -> String {
    format!("{:.2}", mph)
}

/// Calories rounded to two decimals without trailing zeros
pub fn format_calories(calories: f64) -> String {
    let rounded = (calories * 100.0).round() / 100.0;
    format!("{}", rounded)
}

/// Clock time as "HH:MM:SS"
pub fn format_running_time(running_time: Duration) -> String {
    let secs = running_time.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Display strings for one metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsDisplay {
    pub distance: String,
    pub pace: String,
    pub speed: String,
    pub calories: String,
    pub running_time: String,
}

impl From<&WorkoutMetrics> for MetricsDisplay {
    fn from(metrics: &WorkoutMetrics) -> Self {
        Self {
            distance: format_miles(metrics.total_distance_miles),
            pace: format_pace(metrics.average_pace_min_per_mile),
            speed: format_speed(metrics.average_speed_mph),
            calories: format_calories(metrics.calories_burned),
            running_time: format_running_time(metrics.running_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_formatting() {
        assert_eq!(format_pace(8.5), "08:30");
        assert_eq!(format_pace(10.0 + 59.9 / 60.0), "10:59");
        assert_eq!(format_pace(0.0), "00:00");
        assert_eq!(format_pace(f64::INFINITY), "00:00");
    }

    #[test]
    fn test_running_time_formatting() {
        assert_eq!(format_running_time(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_running_time(Duration::from_secs(3723)), "01:02:03");
    }

    #[test]
    fn test_metrics_display() {
        let metrics = WorkoutMetrics {
            total_distance_miles: 3.14159,
            average_pace_min_per_mile: 9.25,
            average_speed_mph: 6.486,
            calories_burned: 312.456,
            running_time: Duration::from_secs(1745),
        };
        let display = MetricsDisplay::from(&metrics);

        assert_eq!(display.distance, "3.14");
        assert_eq!(display.pace, "09:15");
        assert_eq!(display.speed, "6.49");
        assert_eq!(display.calories, "312.46");
        assert_eq!(display.running_time, "00:29:05");
        assert_eq!(format_calories(0.0), "0");
    }
}
