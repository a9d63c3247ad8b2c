//! Location acquisition boundary
//!
//! Platform adapters (native delegates, polling geolocation APIs) live in the
//! host application and implement [`LocationService`]. The crate ships a replay
//! adapter that serves a recorded track.

use std::collections::VecDeque;
use tracing::debug;

use crate::error::Result;
use crate::models::GpsSample;

/// Source of GPS fixes for a workout session
pub trait LocationService {
    /// Most recent fix, or None when no new fix is available
    fn current_location(&mut self) -> Option<GpsSample>;

    /// Begin delivering location updates
    fn start_updates(&mut self) -> Result<()>;

    /// Stop delivering location updates
    fn stop_updates(&mut self) -> Result<()>;

    fn is_updating(&self) -> bool;
}

/// Serves a recorded track one fix per poll while updates are active
#[derive(Debug, Clone, Default)]
pub struct ReplayLocationService {
    pending: VecDeque<GpsSample>,
    updating: bool,
}

impl ReplayLocationService {
    pub fn new(samples: Vec<GpsSample>) -> Self {
        Self {
            pending: samples.into(),
            updating: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Timestamp of the fix the next poll will return
    pub fn next_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.pending.front().map(|s| s.timestamp)
    }
}

impl LocationService for ReplayLocationService {
    fn current_location(&mut self) -> Option<GpsSample> {
        if !self.updating {
            return None;
        }
        self.pending.pop_front()
    }

    fn start_updates(&mut self) -> Result<()> {
        debug!(remaining = self.pending.len(), "Replay updates started");
        self.updating = true;
        Ok(())
    }

    fn stop_updates(&mut self) -> Result<()> {
        debug!(remaining = self.pending.len(), "Replay updates stopped");
        self.updating = false;
        Ok(())
    }

    fn is_updating(&self) -> bool {
        self.updating
    }
}
