/*!
 * Process Types
 * Lifecycle states, I/O requests and load-time process descriptions
 */

use crate::core::types::{Pid, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Loaded but not yet arrived
    New,
    /// Queued on a processor
    Ready,
    /// Occupying a processor's running slot
    Running,
    /// Waiting for, or holding, the I/O device
    Blocked,
    /// Finished or killed
    Terminated,
    /// Forked child whose parent terminated; force-terminated immediately
    Orphan,
}

impl ProcessState {
    /// States in which a processor owns the process
    #[inline(always)]
    #[must_use]
    pub const fn is_owned_by_processor(self) -> bool {
        matches!(self, ProcessState::Ready | ProcessState::Running)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "RDY",
            ProcessState::Running => "RUN",
            ProcessState::Blocked => "BLK",
            ProcessState::Terminated => "TRM",
            ProcessState::Orphan => "ORPH",
        };
        f.write_str(tag)
    }
}

/// I/O request pair (IO_R, IO_D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoEvent {
    /// Executed ticks after which the process requests the I/O device
    pub request_time: Tick,
    /// Ticks the device is held
    pub duration: Tick,
}

impl IoEvent {
    #[inline]
    #[must_use]
    pub const fn new(request_time: Tick, duration: Tick) -> Self {
        Self {
            request_time,
            duration,
        }
    }
}

/// Process description produced by a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSpec {
    pub pid: Pid,
    pub arrival_time: Tick,
    pub cpu_time: Tick,
    /// Absolute deadline; defaults to `arrival_time + cpu_time`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Tick>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub io_events: Vec<IoEvent>,
}

impl ProcessSpec {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, arrival_time: Tick, cpu_time: Tick) -> Self {
        Self {
            pid,
            arrival_time,
            cpu_time,
            deadline: None,
            io_events: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Tick) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_io(mut self, request_time: Tick, duration: Tick) -> Self {
        self.io_events.push(IoEvent::new(request_time, duration));
        self
    }

    /// Deadline used for EDF ordering
    #[inline]
    #[must_use]
    pub fn effective_deadline(&self) -> Tick {
        self.deadline
            .unwrap_or(self.arrival_time.saturating_add(self.cpu_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_tags() {
        assert_eq!(ProcessState::Ready.to_string(), "RDY");
        assert_eq!(ProcessState::Orphan.to_string(), "ORPH");
        assert!(ProcessState::Running.is_owned_by_processor());
        assert!(!ProcessState::Blocked.is_owned_by_processor());
    }

    #[test]
    fn test_spec_default_deadline() {
        let spec = ProcessSpec::new(1, 4, 10);
        assert_eq!(spec.effective_deadline(), 14);
        assert_eq!(spec.with_deadline(9).effective_deadline(), 9);
    }

    #[test]
    fn test_default_deadline_saturates() {
        let spec = ProcessSpec::new(1, Tick::MAX - 1, 10);
        assert_eq!(spec.effective_deadline(), Tick::MAX);
    }
}
