//! Unified error hierarchy for LiveRun
//!
//! The metrics engine itself never fails: jitter, bad fixes and degenerate
//! intervals are reported through `UpdateResult`. Errors here cover the
//! collaborators around it (importers, the run clock, configuration).

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::ClockState;

/// Top-level error type for all LiveRun operations
#[derive(Debug, Error)]
pub enum LiveRunError {
    /// Track import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Workout session and clock errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while reading recorded tracks
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No importer handles this file
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Missing required data
    #[error("Missing required data: {field}")]
    MissingData { field: String },
}

/// Errors raised by the run clock and the session driving it
#[derive(Debug, Error)]
pub enum SessionError {
    /// Clock action not allowed from the current state
    #[error("Cannot {action} while clock is {from:?}")]
    InvalidTransition { from: ClockState, action: String },

    /// A host location adapter could not start or stop updates
    #[error("Location service failure: {reason}")]
    LocationService { reason: String },
}

/// Result type alias for LiveRun operations
pub type Result<T> = std::result::Result<T, LiveRunError>;

impl LiveRunError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiveRunError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            LiveRunError::Session(SessionError::InvalidTransition { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Emit this error as a tracing event at its severity level
    pub fn log(&self, message: &str) {
        match self.severity().to_tracing_level() {
            tracing::Level::WARN => tracing::warn!(error = %self, "{}", message),
            _ => tracing::error!(error = %self, "{}", message),
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiveRunError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find track file: {}", path.display())
            }
            LiveRunError::Import(ImportError::UnsupportedFormat { format }) => {
                format!("Track files of type '{}' are not supported. Use GPX or CSV.", format)
            }
            LiveRunError::Import(ImportError::MissingData { field }) => {
                format!("Track file has no usable {} data.", field)
            }
            LiveRunError::Session(SessionError::InvalidTransition { action, .. }) => {
                format!("The workout cannot {} right now.", action)
            }
            LiveRunError::Session(SessionError::LocationService { reason }) => {
                format!("Location updates are unavailable: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The requested operation could not complete
    Error,
    /// Recoverable; the caller can retry or carry on with defaults
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
