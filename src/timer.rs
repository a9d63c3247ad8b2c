//! Workout stopwatch: countdown, running time and pauses
//!
//! Time is always passed in by the caller, which keeps the clock
//! deterministic under test and lets replays run faster than real time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::error::{Result, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Idle,
    CountingDown,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RunClock {
    countdown: Duration,
    state: ClockState,
    /// Start of the current countdown or running stretch
    phase_started_at: Option<DateTime<Utc>>,
    /// Running time banked before the current stretch
    accumulated: Duration,
}

fn elapsed_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}

impl RunClock {
    pub fn new(countdown: Duration) -> Self {
        Self {
            countdown,
            state: ClockState::Idle,
            phase_started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Begin the pre-run countdown (or run straight away when it is zero)
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(ClockState::Idle, "start")?;
        if self.countdown.is_zero() {
            return self.start_immediately(now);
        }
        self.state = ClockState::CountingDown;
        self.phase_started_at = Some(now);
        info!(countdown_secs = self.countdown.as_secs(), "Countdown started");
        Ok(())
    }

    /// Skip any countdown and start running now
    pub fn start_immediately(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !matches!(self.state, ClockState::Idle | ClockState::CountingDown) {
            return Err(self.invalid("start"));
        }
        self.state = ClockState::Running;
        self.phase_started_at = Some(now);
        info!("Workout clock running");
        Ok(())
    }

    /// Promote a finished countdown to running; returns the state afterwards
    pub fn update(&mut self, now: DateTime<Utc>) -> ClockState {
        if self.state == ClockState::CountingDown && self.countdown_remaining(now).is_zero() {
            self.state = ClockState::Running;
            self.phase_started_at = Some(now);
            info!("Countdown finished, workout clock running");
        }
        self.state
    }

    /// Time left on the countdown, zero outside of it
    pub fn countdown_remaining(&self, now: DateTime<Utc>) -> Duration {
        match (self.state, self.phase_started_at) {
            (ClockState::CountingDown, Some(started)) => {
                self.countdown.saturating_sub(elapsed_between(started, now))
            }
            _ => Duration::ZERO,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(ClockState::Running, "pause")?;
        self.bank(now);
        self.state = ClockState::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(ClockState::Paused, "resume")?;
        self.state = ClockState::Running;
        self.phase_started_at = Some(now);
        Ok(())
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Result<ClockState> {
        match self.state {
            ClockState::Paused => self.resume(now)?,
            _ => self.pause(now)?,
        }
        Ok(self.state)
    }

    /// Stop for good; running time is frozen afterwards
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Duration> {
        match self.state {
            ClockState::Running => self.bank(now),
            ClockState::Paused => {}
            _ => return Err(self.invalid("stop")),
        }
        self.state = ClockState::Stopped;
        self.phase_started_at = None;
        Ok(self.accumulated)
    }

    /// Running time so far, excluding countdown and pauses
    pub fn running_time(&self, now: DateTime<Utc>) -> Duration {
        match (self.state, self.phase_started_at) {
            (ClockState::Running, Some(started)) => self.accumulated + elapsed_between(started, now),
            _ => self.accumulated,
        }
    }

    fn bank(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.phase_started_at.take() {
            self.accumulated += elapsed_between(started, now);
        }
    }

    fn require(&self, expected: ClockState, action: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> crate::error::LiveRunError {
        SessionError::InvalidTransition {
            from: self.state,
            action: action.to_string(),
        }
        .into()
    }
}

impl Default for RunClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
