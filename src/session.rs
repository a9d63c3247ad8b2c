//! One workout: clock, location source and metrics engine driven together

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::TrackingSettings;
use crate::engine::WorkoutMetricsEngine;
use crate::error::{Result, SessionError};
use crate::location::LocationService;
use crate::models::{RunnerProfile, UpdateResult, WorkoutMetrics};
use crate::summary::WorkoutSummary;
use crate::timer::{ClockState, RunClock};

/// What a single [`WorkoutSession::tick`] did
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: ClockState,
    pub running_time: Duration,
    /// Engine result for the fix polled this tick, if any
    pub update: Option<UpdateResult>,
}

pub struct WorkoutSession<L: LocationService> {
    id: Uuid,
    started_at: Option<DateTime<Utc>>,
    clock: RunClock,
    engine: WorkoutMetricsEngine,
    location: L,
}

impl<L: LocationService> WorkoutSession<L> {
    pub fn new(profile: RunnerProfile, settings: &TrackingSettings, location: L) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: None,
            clock: RunClock::new(Duration::from_secs(settings.countdown_seconds)),
            engine: WorkoutMetricsEngine::new(profile)
                .with_movement_threshold(settings.movement_threshold_miles),
            location,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        self.engine.metrics()
    }

    pub fn engine(&self) -> &WorkoutMetricsEngine {
        &self.engine
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Start location updates and the countdown.
    ///
    /// The clock only leaves `Idle` once the location service is delivering.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        let state = self.clock.state();
        if state != ClockState::Idle {
            return Err(SessionError::InvalidTransition {
                from: state,
                action: "start".to_string(),
            }
            .into());
        }
        self.location.start_updates()?;
        self.clock.start(now)?;
        self.started_at = Some(now);
        info!(session = %self.id, "Workout session started");
        Ok(())
    }

    /// Skip the countdown
    pub fn start_immediately(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.clock.state() == ClockState::Idle {
            self.location.start_updates()?;
            self.started_at = Some(now);
        }
        self.clock.start_immediately(now)
    }

    /// Advance the session to `now`: settle the clock and, while running,
    /// push running time into the engine and feed it the next available fix
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let state = self.clock.update(now);
        let running_time = self.clock.running_time(now);

        let update = if state == ClockState::Running {
            self.engine.set_running_time(running_time);
            self.location
                .current_location()
                .map(|sample| self.engine.accept_sample(sample))
        } else {
            None
        };

        TickOutcome {
            state,
            running_time,
            update,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.clock.pause(now)?;
        self.engine.set_running_time(self.clock.running_time(now));
        self.location.stop_updates()
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.clock.resume(now)?;
        self.location.start_updates()
    }

    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Result<ClockState> {
        match self.clock.state() {
            ClockState::Paused => self.resume(now)?,
            _ => self.pause(now)?,
        }
        Ok(self.clock.state())
    }

    /// Stop the workout and hand off the track with its final statistics
    pub fn finish(mut self, now: DateTime<Utc>) -> Result<WorkoutSummary> {
        let running_time = self.clock.stop(now)?;
        if let Err(e) = self.location.stop_updates() {
            warn!(error = %e, "Failed to stop location updates");
        }
        self.engine.set_running_time(running_time);

        let (track, metrics) = self.engine.finish();
        info!(
            session = %self.id,
            samples = track.len(),
            miles = metrics.total_distance_miles,
            calories = metrics.calories_burned,
            "Workout session finished"
        );

        Ok(WorkoutSummary::new(
            self.id,
            self.started_at.unwrap_or(now),
            metrics,
            track,
        ))
    }
}
