use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{GeoPoint, GpsSample, SpeedBandSegment, WorkoutMetrics};
use crate::segments::SpeedBandSegmenter;

/// Map framing for a finished workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOverview {
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Midpoint of start and end
    pub center: GeoPoint,
    /// Radius around `center` to show, 32% of the distance run
    pub zoom_radius_miles: f64,
}

impl TrackOverview {
    pub fn from_track(track: &[GpsSample], total_distance_miles: f64) -> Option<Self> {
        let start = track.first()?.point();
        let end = track.last()?.point();
        Some(Self {
            start,
            end,
            center: GeoPoint::new(
                (start.latitude + end.latitude) / 2.0,
                (start.longitude + end.longitude) / 2.0,
            ),
            zoom_radius_miles: total_distance_miles * 32.0 / 100.0,
        })
    }
}

/// Everything the detail view needs once a workout ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub metrics: WorkoutMetrics,
    pub track: Vec<GpsSample>,
    pub segments: Vec<SpeedBandSegment>,
    pub overview: Option<TrackOverview>,
}

impl WorkoutSummary {
    pub fn new(id: Uuid, started_at: DateTime<Utc>, metrics: WorkoutMetrics, track: Vec<GpsSample>) -> Self {
        let segments = SpeedBandSegmenter::segment(&track);
        let overview = TrackOverview::from_track(&track, metrics.total_distance_miles);
        Self {
            id,
            started_at,
            metrics,
            track,
            segments,
            overview,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
