/*!
 * Scheduler Status
 * Load status and container census
 */

use super::Scheduler;
use crate::core::errors::LoadError;
use crate::core::types::Pid;
use serde::Serialize;
use std::fmt;

/// Outcome of the last load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    NotLoaded,
    Loaded { processes: usize, processors: usize },
    Failed(LoadError),
}

impl LoadStatus {
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::NotLoaded => f.write_str("not loaded"),
            LoadStatus::Loaded {
                processes,
                processors,
            } => write!(f, "loaded {processes} processes on {processors} processors"),
            LoadStatus::Failed(err) => write!(f, "file failed to load: {err}"),
        }
    }
}

/// Number of pids held by each kind of container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub new: usize,
    pub ready: usize,
    pub running: usize,
    pub blocked: usize,
    pub io: usize,
    pub unplaced: usize,
    pub terminated: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.new + self.ready + self.running + self.blocked + self.io + self.unplaced + self.terminated
    }
}

impl Scheduler {
    pub fn census(&self) -> Census {
        Census {
            new: self.new_queue.len(),
            ready: self.processors.iter().map(|p| p.ready_len()).sum(),
            running: self.processors.iter().filter(|p| p.running().is_some()).count(),
            blocked: self.blocked.len(),
            io: usize::from(self.io_device.is_some()),
            unplaced: self.unplaced.len(),
            terminated: self.terminated.len(),
        }
    }

    /// Every pid held by any container, with repetitions if a pid is
    /// (wrongly) held twice
    pub fn container_pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.new_queue.iter().copied().collect();
        for processor in &self.processors {
            pids.extend(processor.running());
            pids.extend(processor.ready_pids());
        }
        pids.extend(self.blocked.iter().copied());
        pids.extend(self.io_device.map(|slot| slot.pid));
        pids.extend(self.unplaced.iter().map(|u| u.pid));
        pids.extend(self.terminated.iter().copied());
        pids
    }
}
