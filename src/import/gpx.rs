use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

use crate::error::{ImportError, LiveRunError, Result};
use crate::geo::derive_missing_speeds;
use crate::import::{has_extension, TrackImporter};
use crate::models::GpsSample;

/// GPX importer for recorded GPS tracks
#[derive(Debug, Clone, Default)]
pub struct GpxImporter {
    derive_speed: bool,
}

fn parse_error(reason: impl ToString) -> LiveRunError {
    ImportError::ParseError {
        format: "GPX".to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl GpxImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute speeds for points the file leaves without one
    pub fn derive_missing_speed(mut self, derive: bool) -> Self {
        self.derive_speed = derive;
        self
    }

    /// Read every track segment of a GPX document in file order.
    ///
    /// Points without a timestamp cannot be placed on the workout clock and
    /// are skipped.
    pub fn read_samples<R: Read>(&self, reader: R) -> Result<Vec<GpsSample>> {
        let gpx = gpx::read(reader).map_err(parse_error)?;

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for track in gpx.tracks {
            for segment in track.segments {
                for point in segment.points {
                    let Some(time) = point.time else {
                        skipped += 1;
                        continue;
                    };
                    let iso = time.format().map_err(parse_error)?;
                    let timestamp = DateTime::parse_from_rfc3339(&iso)
                        .map_err(parse_error)?
                        .with_timezone(&Utc);

                    let position = point.point();
                    samples.push(GpsSample {
                        latitude: position.y(),
                        longitude: position.x(),
                        speed: point.speed,
                        altitude: point.elevation,
                        timestamp,
                    });
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "Skipped GPX points without timestamps");
        }

        if self.derive_speed {
            derive_missing_speeds(&mut samples);
        }

        Ok(samples)
    }
}

impl TrackImporter for GpxImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "gpx")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<GpsSample>> {
        let file = File::open(file_path)?;
        self.read_samples(BufReader::new(file))
    }

    fn format_name(&self) -> &'static str {
        "GPX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="liverun-tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Lakeside loop</name>
    <trkseg>
      <trkpt lat="59.3293" lon="18.0686"><ele>12.0</ele><time>2024-05-01T07:00:00Z</time></trkpt>
      <trkpt lat="59.3302" lon="18.0686"><ele>13.5</ele><time>2024-05-01T07:00:10Z</time></trkpt>
      <trkpt lat="59.3305" lon="18.0686"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="59.3311" lon="18.0686"><time>2024-05-01T07:00:20.500Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_reads_all_segments_and_skips_untimed_points() {
        let samples = GpxImporter::new().read_samples(TRACK.as_bytes()).unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].latitude, 59.3293);
        assert_eq!(samples[0].longitude, 18.0686);
        assert_eq!(samples[1].altitude, Some(13.5));
        assert_eq!(samples[2].altitude, None);
        assert_eq!(
            (samples[2].timestamp - samples[0].timestamp).num_milliseconds(),
            20_500
        );
        assert!(samples.iter().all(|s| s.speed.is_none()));
    }

    #[test]
    fn test_derived_speed() {
        let samples = GpxImporter::new()
            .derive_missing_speed(true)
            .read_samples(TRACK.as_bytes())
            .unwrap();

        assert_eq!(samples[0].speed, None);
        // 0.0009 degrees of latitude in 10 s
        let speed = samples[1].speed.unwrap();
        assert!((speed - 10.0).abs() < 0.1, "speed {}", speed);
    }

    #[test]
    fn test_malformed_document() {
        let err = GpxImporter::new().read_samples("<gpx><trk>".as_bytes()).unwrap_err();
        assert!(matches!(err, LiveRunError::Import(ImportError::ParseError { .. })));
    }
}
