/*!
 * Process Control Block
 * Timing attributes, I/O queue, fork membership and dynamic state of a simulated task
 */

use super::forking::ForkingData;
use super::types::{IoEvent, ProcessSpec, ProcessState};
use crate::core::types::{Pid, ProcessorId, Tick};
use serde::Serialize;
use std::collections::VecDeque;

/// A simulated task
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    pid: Pid,
    arrival_time: Tick,
    cpu_time: Tick,
    deadline: Tick,

    /// Executed ticks
    ticks: Tick,
    termination_time: Option<Tick>,
    first_run: Option<Tick>,

    io_events: VecDeque<IoEvent>,
    total_io_time: Tick,

    state: ProcessState,
    owner: Option<ProcessorId>,
    forking: ForkingData,

    migrated: bool,
    stolen: bool,
    killed: bool,
}

impl Process {
    pub fn new(
        pid: Pid,
        arrival_time: Tick,
        cpu_time: Tick,
        deadline: Tick,
        io_events: impl IntoIterator<Item = IoEvent>,
    ) -> Self {
        Self {
            pid,
            arrival_time,
            cpu_time,
            deadline,
            ticks: 0,
            termination_time: None,
            first_run: None,
            io_events: io_events.into_iter().collect(),
            total_io_time: 0,
            state: ProcessState::New,
            owner: None,
            forking: ForkingData::default(),
            migrated: false,
            stolen: false,
            killed: false,
        }
    }

    pub fn from_spec(spec: &ProcessSpec) -> Self {
        Self::new(
            spec.pid,
            spec.arrival_time,
            spec.cpu_time,
            spec.effective_deadline(),
            spec.io_events.iter().copied(),
        )
    }

    /// A child forked from `parent` at `now`, placed in the parent's `slot`.
    /// The child runs for whatever the parent had left and inherits its deadline.
    pub(crate) fn forked_from(pid: Pid, parent: &Process, slot: usize, now: Tick) -> Self {
        let mut child = Self::new(pid, now, parent.remaining_time(), parent.deadline, []);
        child.forking = ForkingData::child_of(parent.pid, slot);
        child
    }

    #[inline(always)]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// (AT)
    #[inline(always)]
    pub fn arrival_time(&self) -> Tick {
        self.arrival_time
    }

    /// (CT)
    #[inline(always)]
    pub fn cpu_time(&self) -> Tick {
        self.cpu_time
    }

    #[inline(always)]
    pub fn deadline(&self) -> Tick {
        self.deadline
    }

    #[inline(always)]
    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    /// (TT)
    #[inline]
    pub fn termination_time(&self) -> Option<Tick> {
        self.termination_time
    }

    #[inline(always)]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[inline(always)]
    pub fn owner(&self) -> Option<ProcessorId> {
        self.owner
    }

    #[inline]
    pub fn forking(&self) -> &ForkingData {
        &self.forking
    }

    #[inline]
    pub(crate) fn forking_mut(&mut self) -> &mut ForkingData {
        &mut self.forking
    }

    #[inline]
    pub fn is_migrated(&self) -> bool {
        self.migrated
    }

    #[inline]
    pub fn is_stolen(&self) -> bool {
        self.stolen
    }

    #[inline]
    pub fn is_killed(&self) -> bool {
        self.killed
    }

    #[inline]
    pub fn total_io_time(&self) -> Tick {
        self.total_io_time
    }

    pub fn pending_io_events(&self) -> impl Iterator<Item = &IoEvent> {
        self.io_events.iter()
    }

    /// Ticks left until the burst completes
    #[inline(always)]
    pub fn remaining_time(&self) -> Tick {
        self.cpu_time.saturating_sub(self.ticks)
    }

    #[inline]
    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.ticks >= self.cpu_time
    }

    /// The next I/O request is due
    #[inline]
    pub fn has_io_event(&self) -> bool {
        self.io_events
            .front()
            .is_some_and(|io| io.request_time <= self.ticks)
    }

    pub fn has_any_io_event(&self) -> bool {
        !self.io_events.is_empty()
    }

    /// Dequeue the due I/O request
    pub fn pop_io_event(&mut self) -> Option<IoEvent> {
        self.io_events.pop_front()
    }

    #[inline]
    pub fn can_fork(&self) -> bool {
        self.forking.can_fork()
    }

    #[inline]
    pub fn is_forked(&self) -> bool {
        self.forking.is_forked()
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub(crate) fn set_owner(&mut self, owner: Option<ProcessorId>) {
        self.owner = owner;
    }

    /// Enter RUN; the first run fixes the response time
    pub(crate) fn start_running(&mut self, now: Tick) {
        self.state = ProcessState::Running;
        if self.first_run.is_none() {
            self.first_run = Some(now);
        }
    }

    /// Set the termination time, once
    pub(crate) fn finish(&mut self, now: Tick) {
        if self.termination_time.is_none() {
            self.termination_time = Some(now);
        }
    }

    pub(crate) fn add_io_time(&mut self, duration: Tick) {
        self.total_io_time += duration;
    }

    /// Returns true only the first time
    pub(crate) fn mark_migrated(&mut self) -> bool {
        !std::mem::replace(&mut self.migrated, true)
    }

    /// Returns true only the first time
    pub(crate) fn mark_stolen(&mut self) -> bool {
        !std::mem::replace(&mut self.stolen, true)
    }

    pub(crate) fn mark_killed(&mut self) {
        self.killed = true;
    }

    /// (TRT) time in the system from arrival to termination
    pub fn turnaround_duration(&self) -> Option<Tick> {
        self.termination_time
            .map(|tt| tt.saturating_sub(self.arrival_time))
    }

    /// (WT) time in the system not executing
    pub fn waiting_time(&self) -> Option<Tick> {
        self.turnaround_duration()
            .map(|trt| trt.saturating_sub(self.ticks))
    }

    /// (RT) delay between arrival and first run
    pub fn response_time(&self) -> Option<Tick> {
        self.first_run
            .map(|first| first.saturating_sub(self.arrival_time))
    }

    /// Time since arrival not spent executing, as of `now`
    pub fn waited_until(&self, now: Tick) -> Tick {
        now.saturating_sub(self.arrival_time)
            .saturating_sub(self.ticks)
    }
}
