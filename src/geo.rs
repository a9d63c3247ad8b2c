//! Great-circle distance and unit conversions

use crate::models::{GeoPoint, GpsSample};

/// Mean earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const KM_PER_MILE: f64 = 1.609344;

/// Meters per second to miles per hour
pub const MPS_TO_MPH: f64 = 2.23694;

/// Haversine distance between two points in kilometers
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two points in miles
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_km(a, b) / KM_PER_MILE
}

pub fn distance_between_samples_miles(a: &GpsSample, b: &GpsSample) -> f64 {
    haversine_miles(a.point(), b.point())
}

/// Fill in missing speeds from the distance and time to the previous sample.
///
/// Reported speeds are left untouched. The first sample, and any sample
/// whose interval to its predecessor is not positive, keeps `None`.
pub fn derive_missing_speeds(samples: &mut [GpsSample]) {
    for i in 1..samples.len() {
        if samples[i].speed.is_some() {
            continue;
        }
        let (prev, curr) = (&samples[i - 1], &samples[i]);
        let seconds = (curr.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0;
        if seconds <= 0.0 {
            continue;
        }
        let meters = haversine_km(prev.point(), curr.point()) * 1000.0;
        samples[i].speed = Some(meters / seconds);
    }
}
