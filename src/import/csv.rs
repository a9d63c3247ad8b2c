use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::error::{ImportError, LiveRunError, Result};
use crate::geo::derive_missing_speeds;
use crate::import::{has_extension, TrackImporter};
use crate::models::GpsSample;

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
    derive_speed: bool,
}

fn parse_error(reason: impl ToString) -> LiveRunError {
    ImportError::ParseError {
        format: "CSV".to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(
            &mut column_mapping,
            "timestamp",
            &["timestamp", "time", "datetime", "date_time"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "latitude",
            &["latitude", "lat", "position_lat"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "longitude",
            &["longitude", "lng", "lon", "long", "position_long"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "speed",
            &["speed", "velocity", "speed_ms", "speed_mps"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "altitude",
            &["altitude", "elevation", "alt", "ele", "elev"],
        );

        Self {
            column_mapping,
            derive_speed: false,
        }
    }

    /// Compute speeds for rows that leave the speed column empty
    pub fn derive_missing_speed(mut self, derive: bool) -> Self {
        self.derive_speed = derive;
        self
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn parse_datetime(date_str: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
            return Ok(dt.with_timezone(&Utc));
        }

        let formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%d/%m/%Y %H:%M:%S",
        ];

        for format in &formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(date_str, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        // Seconds since epoch, possibly fractional
        if let Ok(seconds) = date_str.parse::<f64>() {
            let millis = (seconds * 1000.0).round() as i64;
            if let Some(dt) = DateTime::from_timestamp_millis(millis) {
                return Ok(dt);
            }
        }

        Err(parse_error(format!("Unable to parse datetime: {}", date_str)))
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Parse rows into samples; rows without time or position are skipped
    pub fn read_samples<R: Read>(&self, reader: R) -> Result<Vec<GpsSample>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(parse_error)?.clone();
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (self.normalize_column_name(header), i))
            .collect();

        for required in ["timestamp", "latitude", "longitude"] {
            if !columns.contains_key(required) {
                return Err(ImportError::MissingData {
                    field: required.to_string(),
                }
                .into());
            }
        }

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(parse_error)?;
            let field = |name: &str| {
                columns
                    .get(name)
                    .and_then(|&i| record.get(i))
                    .filter(|value| !value.is_empty())
            };
            let number = |name: &str| field(name).and_then(|value| value.parse::<f64>().ok());

            let (Some(time), Some(latitude), Some(longitude)) =
                (field("timestamp"), number("latitude"), number("longitude"))
            else {
                skipped += 1;
                continue;
            };

            let timestamp = Self::parse_datetime(time).map_err(|e| {
                parse_error(format!("row {}: {}", row + 1, e))
            })?;

            samples.push(GpsSample {
                latitude,
                longitude,
                speed: number("speed"),
                altitude: number("altitude"),
                timestamp,
            });
        }

        if skipped > 0 {
            warn!(skipped, "Skipped CSV rows without time or position");
        }

        if self.derive_speed {
            derive_missing_speeds(&mut samples);
        }

        Ok(samples)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackImporter for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<GpsSample>> {
        let file = std::fs::File::open(file_path)?;
        self.read_samples(file)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_column_aliases() {
        let data = "\
Time,Lat,Lng,Speed,Elevation
2024-05-01T07:00:00Z,40.7128,-74.0060,2.8,10
2024-05-01 07:00:01,40.7129,-74.0060,,11.5
";
        let samples = CsvImporter::new().read_samples(data.as_bytes()).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].speed, Some(2.8));
        assert_eq!(samples[0].altitude, Some(10.0));
        assert_eq!(samples[1].speed, None);
        assert_eq!(
            samples[1].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 1).unwrap()
        );
    }

    #[test]
    fn test_epoch_seconds_and_skipped_rows() {
        let data = "\
timestamp,latitude,longitude
1714546800,40.7128,-74.0060
1714546801.5,,-74.0060
1714546802.5,40.7130,-74.0060
";
        let samples = CsvImporter::new().read_samples(data.as_bytes()).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(
            (samples[1].timestamp - samples[0].timestamp).num_milliseconds(),
            2_500
        );
    }

    #[test]
    fn test_missing_position_column() {
        let data = "time,lat\n2024-05-01T07:00:00Z,40.0\n";
        let err = CsvImporter::new().read_samples(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LiveRunError::Import(ImportError::MissingData { ref field }) if field == "longitude"
        ));
    }

    #[test]
    fn test_bad_timestamp() {
        let data = "time,lat,lon\nyesterday,40.0,-74.0\n";
        assert!(CsvImporter::new().read_samples(data.as_bytes()).is_err());
    }
}
