/*!
 * Statistics
 * Terminal metrics aggregated from processes as they finish, plus the
 * plain-text report
 */

use crate::core::config::SimulationConfig;
use crate::core::types::{Pid, Tick};
use crate::process::{Process, ProcessState};
use crate::processor::Processor;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Counted scheduling events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    /// RR -> SJF migration on remaining time
    MigrationRtf,
    /// FCFS -> RR migration on waiting time
    MigrationMaxW,
    WorkSteal,
    Fork,
    Kill,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 5] = [
        StatisticKind::MigrationRtf,
        StatisticKind::MigrationMaxW,
        StatisticKind::WorkSteal,
        StatisticKind::Fork,
        StatisticKind::Kill,
    ];

    const fn index(self) -> usize {
        match self {
            StatisticKind::MigrationRtf => 0,
            StatisticKind::MigrationMaxW => 1,
            StatisticKind::WorkSteal => 2,
            StatisticKind::Fork => 3,
            StatisticKind::Kill => 4,
        }
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatisticKind::MigrationRtf => "MigrationRTF",
            StatisticKind::MigrationMaxW => "MigrationMaxW",
            StatisticKind::WorkSteal => "WorkSteal",
            StatisticKind::Fork => "Fork",
            StatisticKind::Kill => "Kill",
        };
        f.write_str(name)
    }
}

/// Snapshot of a terminated process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStatEntry {
    pub termination_time: Tick,
    pub pid: Pid,
    pub arrival_time: Tick,
    pub cpu_time: Tick,
    pub io_duration: Tick,
    pub waiting_time: Tick,
    pub response_time: Tick,
    pub turnaround: Tick,
    pub deadline: Tick,
    pub killed: bool,
    pub orphaned: bool,
}

impl ProcessStatEntry {
    /// Snapshot `process`; it must already carry a termination time
    pub fn from_process(process: &Process) -> Self {
        let termination_time = process.termination_time().unwrap_or(process.arrival_time());
        Self {
            termination_time,
            pid: process.pid(),
            arrival_time: process.arrival_time(),
            cpu_time: process.cpu_time(),
            io_duration: process.total_io_time(),
            waiting_time: process.waiting_time().unwrap_or(0),
            // Never dispatched (killed while ready): it waited its whole lifetime
            response_time: process
                .response_time()
                .unwrap_or_else(|| termination_time.saturating_sub(process.arrival_time())),
            turnaround: process.turnaround_duration().unwrap_or(0),
            deadline: process.deadline(),
            killed: process.is_killed(),
            orphaned: process.state() == ProcessState::Orphan,
        }
    }

    #[inline]
    pub fn met_deadline(&self) -> bool {
        self.termination_time <= self.deadline
    }
}

/// Statistics sink
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    processes: Vec<ProcessStatEntry>,
    counters: [u64; 5],
    first_arrival: Option<Tick>,
    last_time: Tick,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_terminated(&mut self, process: &Process) {
        let entry = ProcessStatEntry::from_process(process);
        self.first_arrival = Some(
            self.first_arrival
                .map_or(entry.arrival_time, |t| t.min(entry.arrival_time)),
        );
        self.last_time = self.last_time.max(entry.termination_time);
        self.processes.push(entry);
    }

    pub fn record_event(&mut self, kind: StatisticKind) {
        self.counters[kind.index()] += 1;
    }

    pub fn count(&self, kind: StatisticKind) -> u64 {
        self.counters[kind.index()]
    }

    /// Terminated processes in termination order
    pub fn entries(&self) -> &[ProcessStatEntry] {
        &self.processes
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Span from the first arrival to the last termination
    pub fn total_time(&self) -> Tick {
        self.first_arrival
            .map_or(0, |first| self.last_time.saturating_sub(first))
    }

    fn average(&self, field: impl Fn(&ProcessStatEntry) -> Tick) -> f64 {
        if self.processes.is_empty() {
            return 0.0;
        }
        let total: Tick = self.processes.iter().map(field).sum();
        total as f64 / self.processes.len() as f64
    }

    pub fn average_waiting_time(&self) -> f64 {
        self.average(|e| e.waiting_time)
    }

    pub fn average_response_time(&self) -> f64 {
        self.average(|e| e.response_time)
    }

    pub fn average_turnaround(&self) -> f64 {
        self.average(|e| e.turnaround)
    }

    pub fn average_deadline(&self) -> f64 {
        self.average(|e| e.deadline)
    }

    /// Sum of turnaround durations; the denominator of processor load
    pub fn total_turnaround(&self) -> Tick {
        self.processes.iter().map(|e| e.turnaround).sum()
    }

    /// Share of processes that finished by their deadline, in percent
    pub fn deadline_met_percent(&self) -> f64 {
        self.percent_of_processes(self.processes.iter().filter(|e| e.met_deadline()).count() as u64)
    }

    /// `kind` occurrences relative to the number of terminated processes, in percent
    pub fn event_percent(&self, kind: StatisticKind) -> f64 {
        self.percent_of_processes(self.count(kind))
    }

    fn percent_of_processes(&self, count: u64) -> f64 {
        if self.processes.is_empty() {
            return 0.0;
        }
        count as f64 / self.processes.len() as f64 * 100.0
    }

    /// Write the tabular report
    pub fn write_report<W: Write>(
        &self,
        processors: &[Processor],
        config: &SimulationConfig,
        mut out: W,
    ) -> io::Result<()> {
        const HEADER: [&str; 9] = ["TT", "PID", "AT", "CT", "IO_D", "WT", "RT", "TRT", "DL"];

        for column in HEADER {
            write!(out, "{column:<10}")?;
        }
        writeln!(out)?;

        for e in &self.processes {
            let row = [
                e.termination_time,
                Tick::from(e.pid),
                e.arrival_time,
                e.cpu_time,
                e.io_duration,
                e.waiting_time,
                e.response_time,
                e.turnaround,
                e.deadline,
            ];
            for value in row {
                write!(out, "{value:<10}")?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;

        writeln!(out, "Processes: {}", self.processes.len())?;
        writeln!(
            out,
            "Avg WT = {:.0}\t\tAvg RT = {:.0}\t\tAvg TRT = {:.0}\t\tAvg DL = {:.0}",
            self.average_waiting_time(),
            self.average_response_time(),
            self.average_turnaround(),
            self.average_deadline()
        )?;
        writeln!(
            out,
            "Migration %:\t\tRTF = {:.0}%\t\tMaxW = {:.0}%",
            self.event_percent(StatisticKind::MigrationRtf),
            self.event_percent(StatisticKind::MigrationMaxW)
        )?;
        writeln!(out, "Work Steal %: {:.0}%", self.event_percent(StatisticKind::WorkSteal))?;
        writeln!(out, "Forked Process %: {:.0}%", self.event_percent(StatisticKind::Fork))?;
        writeln!(out, "Killed Process %: {:.0}%", self.event_percent(StatisticKind::Kill))?;
        writeln!(out, "Deadline Met %: {:.0}%", self.deadline_met_percent())?;
        writeln!(out)?;

        let pools: Vec<String> = [
            (config.fcfs_count, "FCFS"),
            (config.sjf_count, "SJF"),
            (config.rr_count, "RR"),
            (config.edf_count, "EDF"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, name)| format!("{count} {name}"))
        .collect();
        writeln!(out, "Processors: {} [{}]", processors.len(), pools.join(", "))?;

        let total_turnaround = self.total_turnaround();
        let loads: Vec<String> = processors
            .iter()
            .map(|p| format!("P{} = {:.2}%", p.id() + 1, p.load(total_turnaround) * 100.0))
            .collect();
        writeln!(out, "Processors Load")?;
        writeln!(out, "{}", loads.join(",\t"))?;

        let utilizations: Vec<String> = processors
            .iter()
            .map(|p| format!("P{} = {:.2}%", p.id() + 1, p.utilization() * 100.0))
            .collect();
        writeln!(out, "Processors Utilization")?;
        writeln!(out, "{}", utilizations.join(",\t"))?;

        let average_utilization = if processors.is_empty() {
            0.0
        } else {
            processors.iter().map(Processor::utilization).sum::<f64>() / processors.len() as f64
        };
        writeln!(out, "Avg utilization = {:.1}%", average_utilization * 100.0)?;

        Ok(())
    }
}
