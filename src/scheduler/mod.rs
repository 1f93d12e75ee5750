/*!
 * Scheduler
 *
 * Owns every processor, the process table and the new/blocked/terminated
 * containers, and drives one discrete timestep per `update()`.
 *
 * Each live pid sits in exactly one container at a time: the new queue, a
 * processor's ready structure or running slot, the blocked FIFO, the I/O
 * device, the unplaced queue, or the terminated list.
 */

mod balance;
mod builder;
mod dispatch;
mod io;
mod lifecycle;
mod status;
mod update;

pub use builder::SchedulerBuilder;
pub use io::IoSlot;
pub use status::{Census, LoadStatus};

use crate::core::config::{EngineOptions, SimulationConfig};
use crate::core::errors::{LoadResult, SchedulerError, SchedulerResult};
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::loader::{self, LoadedData};
use crate::monitoring::{EventLog, Statistics};
use crate::process::{Process, ProcessTable};
use crate::processor::{Processor, ProcessorType};
use crate::simulation::{SigkillSchedule, SimulationContext, SimulationInfo};
use std::collections::VecDeque;
use std::path::Path;
use tracing::{info, warn};

/// A dispatch that found no eligible processor, retried every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unplaced {
    pub pid: Pid,
    pub filter: Option<ProcessorType>,
}

/// Multi-processor scheduling engine
pub struct Scheduler {
    processors: Vec<Processor>,
    table: ProcessTable,

    /// Not yet arrived, ordered by arrival time
    new_queue: VecDeque<Pid>,
    /// Waiting for the I/O device
    blocked: VecDeque<Pid>,
    io_device: Option<IoSlot>,
    terminated: Vec<Pid>,
    unplaced: VecDeque<Unplaced>,

    context: SimulationContext,
    info: SimulationInfo,
    stats: Statistics,
    status: LoadStatus,

    /// Timestep at which the run ended
    finished_at: Option<Tick>,
}

impl Scheduler {
    /// Scheduler with nothing loaded; `update()` ends the run immediately
    pub fn new(context: SimulationContext, info: SimulationInfo) -> Self {
        Self {
            processors: Vec::new(),
            table: ProcessTable::new(),
            new_queue: VecDeque::new(),
            blocked: VecDeque::new(),
            io_device: None,
            terminated: Vec::new(),
            unplaced: VecDeque::new(),
            context,
            info,
            stats: Statistics::new(),
            status: LoadStatus::NotLoaded,
            finished_at: None,
        }
    }

    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    /// Replace the population with `data`.
    ///
    /// On failure the scheduler is left with zero processors and a failed
    /// status, so the next `update()` ends the run.
    pub fn load_data(&mut self, data: LoadedData) -> LoadResult<()> {
        self.reset();

        if let Err(err) = data.validate() {
            warn!(error = %err, "rejecting simulation input");
            self.status = LoadStatus::Failed(err.clone());
            return Err(err);
        }

        let LoadedData {
            config,
            processes,
            sigkills,
        } = data;

        let mut id: ProcessorId = 0;
        for (kind, count) in [
            (ProcessorType::Fcfs, config.fcfs_count),
            (ProcessorType::Sjf, config.sjf_count),
            (ProcessorType::Rr, config.rr_count),
            (ProcessorType::Edf, config.edf_count),
        ] {
            for _ in 0..count {
                self.processors.push(Processor::new(id, kind));
                id += 1;
            }
        }

        let mut arrivals: Vec<(Tick, Pid)> = Vec::with_capacity(processes.len());
        for spec in &processes {
            arrivals.push((spec.arrival_time, spec.pid));
            self.table.insert(Process::from_spec(spec));
        }
        // Stable: equal arrival times keep input order
        arrivals.sort_by_key(|&(at, _)| at);
        self.new_queue = arrivals.into_iter().map(|(_, pid)| pid).collect();

        self.context.sigkills = SigkillSchedule::new(sigkills);
        self.context.config = config;
        self.status = LoadStatus::Loaded {
            processes: self.table.created(),
            processors: self.processors.len(),
        };

        info!(
            processes = self.table.created(),
            processors = self.processors.len(),
            kills = self.context.sigkills.len(),
            "simulation input loaded"
        );
        Ok(())
    }

    /// Load `path` with the loader its extension selects
    pub fn load_path(&mut self, path: &Path) -> LoadResult<()> {
        match loader::load_file(path) {
            Ok(data) => self.load_data(data),
            Err(err) => {
                self.reset();
                warn!(path = %path.display(), error = %err, "failed to load simulation input");
                self.status = LoadStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.processors.clear();
        self.table = ProcessTable::new();
        self.new_queue.clear();
        self.blocked.clear();
        self.io_device = None;
        self.terminated.clear();
        self.unplaced.clear();
        self.context.sigkills = SigkillSchedule::default();
        self.context.log.clear();
        self.stats = Statistics::new();
        self.status = LoadStatus::NotLoaded;
        self.finished_at = None;
        self.info.stop();
    }

    /// Start playback and tick until every process has terminated.
    /// Ignores the mode's pacing.
    pub fn run_until_finished(&mut self, tick_limit: u64) -> SchedulerResult<Tick> {
        if !self.status.is_loaded() {
            return Err(SchedulerError::NotLoaded);
        }
        self.info.start();

        let mut ticks = 0;
        while self.finished_at.is_none() {
            if ticks >= tick_limit {
                return Err(SchedulerError::TickLimitExceeded(tick_limit));
            }
            self.update();
            ticks += 1;
        }
        Ok(self.current_time())
    }

    #[inline]
    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processor(&self, id: ProcessorId) -> Option<&Processor> {
        self.processors.get(id)
    }

    #[inline]
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.table.get(pid)
    }

    #[inline]
    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn new_pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.new_queue.iter().copied()
    }

    pub fn blocked_pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.blocked.iter().copied()
    }

    #[inline]
    pub fn io_device(&self) -> Option<IoSlot> {
        self.io_device
    }

    /// Pids in termination order
    #[inline]
    pub fn terminated(&self) -> &[Pid] {
        &self.terminated
    }

    pub fn unplaced_pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.unplaced.iter().map(|u| u.pid)
    }

    /// Every process ever created, forked children included
    #[inline]
    pub fn total_processes(&self) -> usize {
        self.table.created()
    }

    #[inline]
    pub fn info(&self) -> &SimulationInfo {
        &self.info
    }

    #[inline]
    pub fn info_mut(&mut self) -> &mut SimulationInfo {
        &mut self.info
    }

    #[inline]
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.context.config
    }

    #[inline]
    pub fn options(&self) -> &EngineOptions {
        &self.context.options
    }

    #[inline]
    pub fn event_log(&self) -> &EventLog {
        &self.context.log
    }

    #[inline]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// The timestep being simulated, or the one the run ended on
    pub fn current_time(&self) -> Tick {
        self.finished_at.unwrap_or_else(|| self.info.timestep())
    }

    /// Write the statistics report for the run so far
    pub fn write_statistics<W: std::io::Write>(&self, out: W) -> std::io::Result<()> {
        self.stats.write_report(&self.processors, &self.context.config, out)
    }

    pub(crate) fn log(&mut self, message: impl Into<String>) {
        let now = self.info.timestep();
        self.context.log.log(now, message);
    }

    pub(crate) fn log_colored(&mut self, message: impl Into<String>, color: crate::monitoring::EventColor) {
        let now = self.info.timestep();
        self.context.log.log_colored(now, message, color);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("processors", &self.processors.len())
            .field("processes", &self.table.len())
            .field("terminated", &self.terminated.len())
            .field("timestep", &self.current_time())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
