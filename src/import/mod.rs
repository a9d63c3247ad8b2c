use std::path::Path;
use tracing::info;

use crate::error::{ImportError, Result};
use crate::models::GpsSample;

pub mod csv;
pub mod gpx;

/// Trait for reading recorded GPS tracks from different file formats
pub trait TrackImporter {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read the track as chronologically ordered samples
    fn import_file(&self, file_path: &Path) -> Result<Vec<GpsSample>>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

pub(crate) fn has_extension(file_path: &Path, wanted: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn TrackImporter>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        Self::with_derived_speed(false)
    }

    /// Like [`new`](Self::new), optionally filling missing speeds from positions
    pub fn with_derived_speed(derive_speed: bool) -> Self {
        let importers: Vec<Box<dyn TrackImporter>> = vec![
            Box::new(gpx::GpxImporter::new().derive_missing_speed(derive_speed)),
            Box::new(csv::CsvImporter::new().derive_missing_speed(derive_speed)),
        ];

        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<GpsSample>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                format: file_path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<none>".to_string()),
            })?;

        info!(
            file = %file_path.display(),
            format = importer.format_name(),
            "Importing track"
        );
        let samples = importer.import_file(file_path)?;
        if samples.is_empty() {
            return Err(ImportError::MissingData {
                field: "track point".to_string(),
            }
            .into());
        }
        Ok(samples)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}
