// Library interface for LiveRun modules
// The binary and the integration tests both build on these

pub mod calories;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod geo;
pub mod import;
pub mod location;
pub mod logging;
pub mod models;
pub mod segments;
pub mod session;
pub mod summary;
pub mod timer;

// Re-export commonly used types for convenience
pub use models::*;
pub use calories::{estimate_calories, lookup_met, CalorieModel, SPEED_MET_TABLE};
pub use engine::WorkoutMetricsEngine;
pub use segments::SpeedBandSegmenter;
pub use session::WorkoutSession;
pub use summary::{TrackOverview, WorkoutSummary};
pub use timer::{ClockState, RunClock};
pub use location::{LocationService, ReplayLocationService};
pub use error::{LiveRunError, Result};
pub use logging::{LogConfig, LogLevel, LogFormat};
