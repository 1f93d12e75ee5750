/*!
 * Processor
 * A simulated CPU: one running slot, a variant ready structure and a load timer
 */

mod entry;
mod ready;
pub mod types;

use crate::core::types::{Pid, ProcessorId, Tick};
use crate::process::{Process, ProcessState, ProcessTable};
use ready::ReadyQueue;
use serde::Serialize;
use tracing::debug;

pub use types::{ProcessorState, ProcessorType, StealHandle};
use types::StealSlot;

/// Cumulative ticks spent in each processor state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateTicks {
    pub busy: Tick,
    pub idle: Tick,
    pub stop: Tick,
}

impl StateTicks {
    pub fn total(&self) -> Tick {
        self.busy + self.idle + self.stop
    }
}

/// A simulated processor
///
/// The processor only manipulates its own containers. Anything that crosses
/// processors (termination, blocking, migration, forking) is driven by the
/// [`Scheduler`](crate::scheduler::Scheduler), which owns every processor.
#[derive(Debug, Clone)]
pub struct Processor {
    id: ProcessorId,
    kind: ProcessorType,
    state: ProcessorState,
    ready: ReadyQueue,
    running: Option<Pid>,

    /// Sum of remaining time over ready and running processes
    timer: Tick,

    /// Executed ticks of the running process when its RR slice began
    slice_start: Tick,

    /// Ticks spent in the current STOP episode
    stop_elapsed: Tick,

    state_ticks: StateTicks,

    /// Insertion counter for FIFO tie-breaks in heaps
    seq: u64,
}

impl Processor {
    pub fn new(id: ProcessorId, kind: ProcessorType) -> Self {
        Self {
            id,
            kind,
            state: ProcessorState::Idle,
            ready: ReadyQueue::for_type(kind),
            running: None,
            timer: 0,
            slice_start: 0,
            stop_elapsed: 0,
            state_ticks: StateTicks::default(),
            seq: 0,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ProcessorId {
        self.id
    }

    #[inline(always)]
    pub fn kind(&self) -> ProcessorType {
        self.kind
    }

    #[inline(always)]
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    #[inline(always)]
    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state == ProcessorState::Stop
    }

    /// Running a process or holding ready ones
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.running.is_some() || !self.ready.is_empty()
    }

    #[inline]
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Ready pids in dispatch order
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready.ordered()
    }

    pub fn holds(&self, pid: Pid) -> bool {
        self.running == Some(pid) || self.ready.contains(pid)
    }

    #[inline]
    pub fn state_ticks(&self) -> StateTicks {
        self.state_ticks
    }

    #[inline]
    pub fn slice_start(&self) -> Tick {
        self.slice_start
    }

    /// Ready head, the next process to dispatch
    pub fn peek_ready(&self) -> Option<Pid> {
        self.ready.peek()
    }

    /// Load timer; `with_running = false` leaves out the running process so a
    /// processor is not penalized for the work it is already executing
    pub fn concurrent_timer(&self, with_running: bool, table: &ProcessTable) -> Tick {
        match self.running {
            Some(pid) if !with_running => self.timer.saturating_sub(table.remaining_time(pid)),
            _ => self.timer,
        }
    }

    /// Subtract `amount` from the load timer
    #[inline]
    pub fn decrement_timer(&mut self, amount: Tick) {
        self.timer = self.timer.saturating_sub(amount);
    }

    fn priority_key(&self, process: &Process) -> Tick {
        match self.kind {
            ProcessorType::Sjf => process.remaining_time(),
            ProcessorType::Edf => process.deadline(),
            ProcessorType::Fcfs | ProcessorType::Rr => 0,
        }
    }

    fn push_ready(&mut self, process: &Process) {
        let key = self.priority_key(process);
        self.seq += 1;
        self.ready.push(process.pid(), key, self.seq);
    }

    /// Append to the ready structure and take ownership
    pub fn queue_process(&mut self, process: &mut Process) {
        self.timer += process.remaining_time();
        process.set_state(ProcessState::Ready);
        process.set_owner(Some(self.id));
        self.push_ready(process);
        debug!(
            processor = self.id,
            kind = %self.kind,
            pid = process.pid(),
            timer = self.timer,
            "process queued"
        );
    }

    /// Put `process` (already removed from the ready structure) in the running slot
    pub fn run_process(&mut self, process: &mut Process, now: Tick) {
        debug_assert!(self.running.is_none());
        process.start_running(now);
        process.set_owner(Some(self.id));
        self.slice_start = process.ticks();
        self.running = Some(process.pid());
        self.state = ProcessorState::Busy;
        debug!(processor = self.id, pid = process.pid(), now, "process running");
    }

    /// Dequeue the ready head
    pub fn pop_ready(&mut self) -> Option<Pid> {
        self.ready.pop()
    }

    /// Advance the running process by one tick
    pub fn tick_running(&mut self, table: &mut ProcessTable) -> Option<Pid> {
        let pid = self.running?;
        if let Some(process) = table.get_mut(pid) {
            process.tick();
            self.decrement_timer(1);
        }
        Some(pid)
    }

    /// Empty the running slot and release its remaining time from the timer.
    /// The caller decides where the process goes next.
    pub fn take_running(&mut self, table: &mut ProcessTable) -> Option<Pid> {
        let pid = self.running.take()?;
        if let Some(process) = table.get_mut(pid) {
            self.decrement_timer(process.remaining_time());
            process.set_owner(None);
        }
        self.state = ProcessorState::Idle;
        Some(pid)
    }

    /// Move the running process back into this processor's ready structure
    pub fn requeue_running_process(&mut self, table: &mut ProcessTable) -> Option<Pid> {
        let pid = self.running.take()?;
        self.state = ProcessorState::Idle;
        if let Some(process) = table.get_mut(pid) {
            process.set_state(ProcessState::Ready);
            self.push_ready(process);
        }
        debug!(processor = self.id, pid, "running process requeued");
        Some(pid)
    }

    /// Remove `pid` from the ready structure, releasing its timer share
    pub fn remove_ready(&mut self, pid: Pid, table: &mut ProcessTable) -> bool {
        if !self.ready.remove(pid) {
            return false;
        }
        if let Some(process) = table.get_mut(pid) {
            self.decrement_timer(process.remaining_time());
            process.set_owner(None);
        }
        true
    }

    /// Release the timer share of a process that was popped from the ready
    /// structure but is leaving this processor instead of running
    pub fn release_popped(&mut self, process: &mut Process) {
        self.decrement_timer(process.remaining_time());
        process.set_owner(None);
    }

    /// A non-forked ready process that can be removed cheaply, if any
    pub fn steal_handle(&self, table: &ProcessTable) -> Option<StealHandle> {
        let stealable = |pid: Pid| table.get(pid).is_some_and(|p| !p.is_forked());
        self.ready
            .steal_candidate(stealable)
            .map(|(pid, slot)| StealHandle {
                pid,
                processor: self.id,
                slot,
            })
    }

    /// Perform the removal a steal handle describes
    pub fn execute_steal(&mut self, handle: StealHandle, table: &mut ProcessTable) -> Option<Pid> {
        if handle.processor != self.id || !self.ready.take_slot(handle.slot, handle.pid) {
            return None;
        }
        if let Some(process) = table.get_mut(handle.pid) {
            self.decrement_timer(process.remaining_time());
            process.set_owner(None);
        }
        Some(handle.pid)
    }

    /// Any forked process running or ready here
    pub fn holds_forked(&self, table: &ProcessTable) -> bool {
        self.running
            .into_iter()
            .chain(self.ready.ordered())
            .any(|pid| table.get(pid).is_some_and(Process::is_forked))
    }

    /// Empty the processor completely: running process first, then the
    /// ready structure in dispatch order
    pub fn drain_all(&mut self, table: &mut ProcessTable) -> Vec<Pid> {
        let mut drained: Vec<Pid> = self.running.take().into_iter().collect();
        drained.extend(self.ready.drain());
        for &pid in &drained {
            if let Some(process) = table.get_mut(pid) {
                process.set_owner(None);
            }
        }
        self.timer = 0;
        if self.state == ProcessorState::Busy {
            self.state = ProcessorState::Idle;
        }
        drained
    }

    /// Enter STOP
    pub fn overheat(&mut self) {
        self.state = ProcessorState::Stop;
        self.stop_elapsed = 0;
    }

    /// Advance a STOP episode; returns true when the processor recovers
    pub fn tick_stopped(&mut self, delay: Tick) -> bool {
        self.state_ticks.stop += 1;
        self.stop_elapsed += 1;
        if self.stop_elapsed >= delay {
            self.state = ProcessorState::Idle;
            self.stop_elapsed = 0;
            return true;
        }
        false
    }

    /// Count this tick against the current state
    pub fn record_state_tick(&mut self) {
        match self.state {
            ProcessorState::Busy => self.state_ticks.busy += 1,
            ProcessorState::Idle => self.state_ticks.idle += 1,
            ProcessorState::Stop => self.state_ticks.stop += 1,
        }
    }

    /// Busy time relative to the total turnaround of all processes
    pub fn load(&self, total_turnaround: Tick) -> f64 {
        if total_turnaround == 0 {
            return 0.0;
        }
        self.state_ticks.busy as f64 / total_turnaround as f64
    }

    /// Busy time relative to the processor's lifetime
    pub fn utilization(&self) -> f64 {
        let total = self.state_ticks.total();
        if total == 0 {
            return 0.0;
        }
        self.state_ticks.busy as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table_with(processes: &[(Pid, Tick, Tick)]) -> ProcessTable {
        let mut table = ProcessTable::new();
        for &(pid, ct, deadline) in processes {
            table.insert(Process::new(pid, 0, ct, deadline, []));
        }
        table
    }

    fn queue(processor: &mut Processor, table: &mut ProcessTable, pid: Pid) {
        processor.queue_process(table.get_mut(pid).unwrap());
    }

    #[test]
    fn test_timer_tracks_remaining_work() {
        let mut table = table_with(&[(1, 5, 0), (2, 3, 0)]);
        let mut cpu = Processor::new(0, ProcessorType::Fcfs);
        queue(&mut cpu, &mut table, 1);
        queue(&mut cpu, &mut table, 2);
        assert_eq!(cpu.concurrent_timer(true, &table), 8);

        let pid = cpu.pop_ready().unwrap();
        cpu.run_process(table.get_mut(pid).unwrap(), 0);
        assert_eq!(cpu.concurrent_timer(false, &table), 3);

        cpu.tick_running(&mut table);
        assert_eq!(cpu.concurrent_timer(true, &table), 7);
        assert_eq!(cpu.concurrent_timer(false, &table), 3);

        let taken = cpu.take_running(&mut table);
        assert_eq!(taken, Some(1));
        assert_eq!(cpu.concurrent_timer(true, &table), 3);
        assert_eq!(cpu.state(), ProcessorState::Idle);
    }

    #[test]
    fn test_sjf_dispatches_shortest_first() {
        let mut table = table_with(&[(1, 10, 0), (2, 2, 0), (3, 6, 0)]);
        let mut cpu = Processor::new(0, ProcessorType::Sjf);
        for pid in [1, 2, 3] {
            queue(&mut cpu, &mut table, pid);
        }
        assert_eq!(cpu.ready_pids(), vec![2, 3, 1]);
    }

    #[test]
    fn test_edf_orders_by_deadline() {
        let mut table = table_with(&[(1, 4, 30), (2, 4, 10), (3, 4, 20)]);
        let mut cpu = Processor::new(0, ProcessorType::Edf);
        for pid in [1, 2, 3] {
            queue(&mut cpu, &mut table, pid);
        }
        assert_eq!(cpu.peek_ready(), Some(2));
    }

    #[test]
    fn test_requeue_keeps_timer() {
        let mut table = table_with(&[(1, 4, 0), (2, 4, 0)]);
        let mut cpu = Processor::new(0, ProcessorType::Rr);
        queue(&mut cpu, &mut table, 1);
        queue(&mut cpu, &mut table, 2);
        let pid = cpu.pop_ready().unwrap();
        cpu.run_process(table.get_mut(pid).unwrap(), 0);
        cpu.requeue_running_process(&mut table);
        assert_eq!(cpu.ready_pids(), vec![2, 1]);
        assert_eq!(cpu.concurrent_timer(true, &table), 8);
        assert_eq!(table.get(1).unwrap().state(), ProcessState::Ready);
    }

    #[test]
    fn test_steal_handle_releases_timer() {
        let mut table = table_with(&[(1, 4, 0), (2, 6, 0)]);
        let mut cpu = Processor::new(3, ProcessorType::Fcfs);
        queue(&mut cpu, &mut table, 1);
        queue(&mut cpu, &mut table, 2);

        let handle = cpu.steal_handle(&table).unwrap();
        assert_eq!(handle.pid, 1);
        assert_eq!(cpu.execute_steal(handle, &mut table), Some(1));
        assert_eq!(cpu.concurrent_timer(false, &table), 6);
        assert_eq!(cpu.execute_steal(handle, &mut table), None);
    }

    #[test]
    fn test_drain_all_empties_processor() {
        let mut table = table_with(&[(1, 4, 0), (2, 6, 0)]);
        let mut cpu = Processor::new(0, ProcessorType::Fcfs);
        queue(&mut cpu, &mut table, 1);
        queue(&mut cpu, &mut table, 2);
        let pid = cpu.pop_ready().unwrap();
        cpu.run_process(table.get_mut(pid).unwrap(), 0);

        cpu.overheat();
        assert_eq!(cpu.drain_all(&mut table), vec![1, 2]);
        assert!(!cpu.is_busy());
        assert_eq!(cpu.concurrent_timer(true, &table), 0);
        assert!(cpu.is_stopped());
    }

    #[test]
    fn test_stop_recovers_after_delay() {
        let mut cpu = Processor::new(0, ProcessorType::Sjf);
        cpu.overheat();
        assert!(!cpu.tick_stopped(3));
        assert!(!cpu.tick_stopped(3));
        assert!(cpu.tick_stopped(3));
        assert_eq!(cpu.state(), ProcessorState::Idle);
        assert_eq!(cpu.state_ticks().stop, 3);
    }
}
