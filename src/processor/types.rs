/*!
 * Processor Types
 * Dispatch discipline tags, processor states and steal descriptors
 */

use crate::core::types::{Pid, ProcessorId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch discipline of a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorType {
    /// First-come-first-served
    Fcfs,
    /// Shortest job first (non-preemptive, by remaining time)
    Sjf,
    /// Round-robin with a fixed time slice
    Rr,
    /// Earliest deadline first (preemptive)
    Edf,
}

impl ProcessorType {
    pub const ALL: [ProcessorType; 4] = [
        ProcessorType::Fcfs,
        ProcessorType::Sjf,
        ProcessorType::Rr,
        ProcessorType::Edf,
    ];
}

impl fmt::Display for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ProcessorType::Fcfs => "FCFS",
            ProcessorType::Sjf => "SJF",
            ProcessorType::Rr => "RR",
            ProcessorType::Edf => "EDF",
        };
        f.write_str(tag)
    }
}

/// Processor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorState {
    /// No process to execute
    Idle,
    /// Executing a process
    Busy,
    /// Overheated; holds nothing until it recovers
    Stop,
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ProcessorState::Idle => "IDLE",
            ProcessorState::Busy => "BUSY",
            ProcessorState::Stop => "STOP",
        };
        f.write_str(tag)
    }
}

/// Position of a stealable process inside a ready structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StealSlot {
    /// Head of a heap
    Top,
    /// Index into an insertion-ordered queue
    Index(usize),
}

/// A stealable process paired with the removal that detaches it.
///
/// Obtained from [`Processor::steal_handle`](super::Processor::steal_handle)
/// and consumed by [`Processor::execute_steal`](super::Processor::execute_steal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StealHandle {
    pub pid: Pid,
    pub processor: ProcessorId,
    pub(crate) slot: StealSlot,
}
