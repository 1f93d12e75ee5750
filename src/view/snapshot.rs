/*!
 * Scheduler Snapshot
 * Captures RDY/BLK/RUN/TRM/IO state without touching the core
 */

use crate::core::types::{Pid, ProcessorId, Tick};
use crate::monitoring::LogEntry;
use crate::processor::{ProcessorState, ProcessorType};
use crate::scheduler::{IoSlot, Scheduler};
use crate::simulation::{SimulationMode, SimulationState};
use serde::Serialize;
use std::fmt::{self, Write};

/// One processor as seen by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorView {
    pub id: ProcessorId,
    pub kind: ProcessorType,
    pub state: ProcessorState,
    pub running: Option<Pid>,
    pub ready: Vec<Pid>,
    pub timer: Tick,
}

/// Point-in-time copy of everything the renderer shows
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSnapshot {
    pub timestep: Tick,
    pub mode: SimulationMode,
    pub state: SimulationState,
    pub status: String,
    pub finished: bool,
    pub processors: Vec<ProcessorView>,
    pub new: Vec<Pid>,
    pub blocked: Vec<Pid>,
    pub io: Option<IoSlot>,
    pub unplaced: Vec<Pid>,
    pub terminated: Vec<Pid>,
    pub log: Vec<LogEntry>,
}

impl SchedulerSnapshot {
    /// Capture `scheduler`, keeping the `log_lines` most recent log entries
    pub fn capture(scheduler: &Scheduler, log_lines: usize) -> Self {
        let table = scheduler.table();
        let processors = scheduler
            .processors()
            .iter()
            .map(|p| ProcessorView {
                id: p.id(),
                kind: p.kind(),
                state: p.state(),
                running: p.running(),
                ready: p.ready_pids(),
                timer: p.concurrent_timer(true, table),
            })
            .collect();

        Self {
            timestep: scheduler.current_time(),
            mode: scheduler.info().mode(),
            state: scheduler.info().state(),
            status: scheduler.status().to_string(),
            finished: scheduler.is_finished(),
            processors,
            new: scheduler.new_pids().collect(),
            blocked: scheduler.blocked_pids().collect(),
            io: scheduler.io_device(),
            unplaced: scheduler.unplaced_pids().collect(),
            terminated: scheduler.terminated().to_vec(),
            log: scheduler.event_log().recent(log_lines),
        }
    }

    /// Text dump of the snapshot
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.render_to(&mut out);
        out
    }

    pub fn render_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(
            out,
            "Current Timestep: {}  [{} | {}]  {}",
            self.timestep, self.mode, self.state, self.status
        )?;

        section(out, "RDY processes")?;
        for p in &self.processors {
            writeln!(
                out,
                "processor {} [{:<4}] {:<4} {} RDY: {}",
                p.id + 1,
                p.kind.to_string(),
                p.state.to_string(),
                p.ready.len(),
                join(&p.ready)
            )?;
        }

        section(out, "BLK processes")?;
        writeln!(out, "{} BLK: {}", self.blocked.len(), join(&self.blocked))?;

        section(out, "RUN processes")?;
        let running: Vec<String> = self
            .processors
            .iter()
            .filter_map(|p| p.running.map(|pid| format!("{pid}(P{})", p.id + 1)))
            .collect();
        writeln!(out, "{} RUN: {}", running.len(), running.join(", "))?;

        section(out, "TRM processes")?;
        writeln!(out, "{} TRM: {}", self.terminated.len(), join(&self.terminated))?;

        section(out, "IO device")?;
        match self.io {
            Some(slot) => writeln!(
                out,
                "P{} ({} of {} ticks left)",
                slot.pid, slot.remaining, slot.duration
            )?,
            None => writeln!(out, "idle")?,
        }

        if !self.unplaced.is_empty() {
            writeln!(out, "{} waiting for a processor: {}", self.unplaced.len(), join(&self.unplaced))?;
        }

        if !self.log.is_empty() {
            section(out, "log")?;
            for entry in &self.log {
                writeln!(out, "{entry}")?;
            }
        }

        if self.finished {
            writeln!(out, "Simulation finished.")?;
        }
        Ok(())
    }
}

fn section<W: Write>(out: &mut W, title: &str) -> fmt::Result {
    writeln!(out, "{:-^44}", format!(" {title} "))
}

fn join(pids: &[Pid]) -> String {
    pids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
