/*!
 * Simulation Info
 * Run mode and play/pause/stop state machine gating scheduler updates
 */

use crate::core::limits::STEP_BY_STEP_DELAY;
use crate::core::types::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How ticks are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Each tick waits for an explicit advance request
    Interactive,
    /// Ticks advance on a fixed real-time delay
    StepByStep,
    /// Ticks advance as fast as possible
    Silent,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationMode::Interactive => "Interactive",
            SimulationMode::StepByStep => "StepByStep",
            SimulationMode::Silent => "Silent",
        };
        f.write_str(name)
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationState::Stopped => "STOPPED",
            SimulationState::Playing => "PLAYING",
            SimulationState::Paused => "PAUSED",
        };
        f.write_str(name)
    }
}

/// Simulation clock and playback control
#[derive(Debug, Clone, Serialize)]
pub struct SimulationInfo {
    mode: SimulationMode,
    state: SimulationState,
    timestep: Tick,
    /// Interactive mode: a tick has been requested and not yet processed
    dirty: bool,
}

impl Default for SimulationInfo {
    fn default() -> Self {
        Self::new(SimulationMode::Interactive)
    }
}

impl SimulationInfo {
    pub fn new(mode: SimulationMode) -> Self {
        Self {
            mode,
            state: SimulationState::Stopped,
            timestep: 0,
            dirty: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[inline]
    pub fn timestep(&self) -> Tick {
        self.timestep
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == SimulationState::Playing
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the scheduler may run a tick now, and how long the host
    /// should wait before running it
    pub fn can_update_scheduler(&self) -> Option<Duration> {
        if self.state != SimulationState::Playing {
            return None;
        }

        match self.mode {
            SimulationMode::Interactive => self.dirty.then_some(Duration::ZERO),
            SimulationMode::StepByStep => Some(STEP_BY_STEP_DELAY),
            SimulationMode::Silent => Some(Duration::ZERO),
        }
    }

    /// Stopped/Paused -> Playing. False if already playing.
    pub fn start(&mut self) -> bool {
        if self.state == SimulationState::Playing {
            return false;
        }
        self.state = SimulationState::Playing;
        self.dirty = true;
        true
    }

    /// Playing -> Paused only
    pub fn pause(&mut self) -> bool {
        if self.state == SimulationState::Playing {
            self.state = SimulationState::Paused;
            return true;
        }
        false
    }

    /// Any -> Stopped; resets the clock. False if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == SimulationState::Stopped {
            return false;
        }
        self.state = SimulationState::Stopped;
        self.timestep = 0;
        self.dirty = false;
        true
    }

    /// Interactive advance request
    pub fn request_step(&mut self) {
        self.dirty = true;
    }

    /// Change mode; the simulation is stopped first
    pub fn set_mode(&mut self, mode: SimulationMode) {
        self.stop();
        self.mode = mode;
    }

    /// The current tick has been processed: advance the clock, clear the flag
    pub fn notify_updated(&mut self) {
        self.timestep += 1;
        self.dirty = false;
    }
}
