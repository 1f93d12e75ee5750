/*!
 * Dispatch
 * Processor selection, per-variant dispatch algorithms, migration and forking
 */

use super::{Scheduler, Unplaced};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::monitoring::{EventColor, StatisticKind};
use crate::process::{Process, ProcessState};
use crate::processor::ProcessorType;
use tracing::{debug, info, warn};

impl Scheduler {
    /// Active processor matching `filter`, other than `exclude`, with the
    /// least queued work (running process excluded). Ties go to the
    /// earliest registered processor.
    pub fn shortest_queue(
        &self,
        filter: Option<ProcessorType>,
        exclude: Option<ProcessorId>,
    ) -> Option<ProcessorId> {
        self.processors
            .iter()
            .filter(|p| !p.is_stopped())
            .filter(|p| filter.map_or(true, |kind| p.kind() == kind))
            .filter(|p| Some(p.id()) != exclude)
            .min_by_key(|p| p.concurrent_timer(false, &self.table))
            .map(|p| p.id())
    }

    /// Queue `pid` on the least loaded eligible processor
    pub fn schedule(
        &mut self,
        pid: Pid,
        filter: Option<ProcessorType>,
        exclude: Option<ProcessorId>,
    ) -> SchedulerResult<ProcessorId> {
        let target = self
            .shortest_queue(filter, exclude)
            .ok_or_else(|| SchedulerError::NoEligibleProcessor {
                pid,
                filter: filter.map_or_else(|| "any".to_string(), |kind| kind.to_string()),
            })?;
        let process = self
            .table
            .get_mut(pid)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;

        self.processors[target].queue_process(process);
        Ok(target)
    }

    /// `schedule`, parking the pid for a retry when nothing is eligible
    pub(crate) fn dispatch(
        &mut self,
        pid: Pid,
        filter: Option<ProcessorType>,
        exclude: Option<ProcessorId>,
    ) {
        match self.schedule(pid, filter, exclude) {
            Ok(_) => {}
            Err(SchedulerError::NoEligibleProcessor { .. }) => {
                if let Some(process) = self.table.get_mut(pid) {
                    process.set_state(ProcessState::Ready);
                    process.set_owner(None);
                }
                warn!(pid, ?filter, "no eligible processor, dispatch deferred");
                self.unplaced.push_back(Unplaced { pid, filter });
            }
            Err(err) => warn!(pid, error = %err, "dispatch failed"),
        }
    }

    /// Retry deferred dispatches
    pub(crate) fn retry_unplaced(&mut self) {
        for _ in 0..self.unplaced.len() {
            let Some(entry) = self.unplaced.pop_front() else {
                break;
            };
            if self.shortest_queue(entry.filter, None).is_some() {
                self.dispatch(entry.pid, entry.filter, None);
            } else {
                self.unplaced.push_back(entry);
            }
        }
    }

    /// Dispatch every NEW process that has arrived by `now`
    pub(crate) fn admit_arrivals(&mut self, now: Tick) {
        while let Some(&pid) = self.new_queue.front() {
            let arrived = self
                .table
                .get(pid)
                .map_or(true, |p| p.arrival_time() <= now);
            if !arrived {
                break;
            }
            self.new_queue.pop_front();
            if self.table.contains(pid) {
                debug!(pid, now, "process arrived");
                self.dispatch(pid, None, None);
            }
        }
    }

    /// Per-tick dispatch algorithm of processor `id`
    pub(crate) fn schedule_algo(&mut self, id: ProcessorId, now: Tick) {
        match self.processors[id].kind() {
            ProcessorType::Fcfs => self.schedule_fcfs(id, now),
            ProcessorType::Sjf => self.schedule_sjf(id, now),
            ProcessorType::Rr => self.schedule_rr(id, now),
            ProcessorType::Edf => self.schedule_edf(id, now),
        }
    }

    /// Migration to RR takes priority over forking; ready processes that
    /// waited too long are sent to RR until one stays to run; then due
    /// kills are delivered.
    fn schedule_fcfs(&mut self, id: ProcessorId, now: Tick) {
        if let Some(pid) = self.processors[id].running() {
            if !self.try_migrate_running(id, pid, now) {
                self.try_fork(pid, now);
            }
        }

        self.dispatch_next(id, now);
        self.deliver_sigkills(id, now);
    }

    fn schedule_sjf(&mut self, id: ProcessorId, now: Tick) {
        self.dispatch_next(id, now);
    }

    /// Migration to SJF first, then time slice expiry, then dispatch
    fn schedule_rr(&mut self, id: ProcessorId, now: Tick) {
        if let Some(pid) = self.processors[id].running() {
            if !self.try_migrate_running(id, pid, now) {
                let slice_used = self
                    .table
                    .get(pid)
                    .map_or(0, |p| p.ticks().saturating_sub(self.processors[id].slice_start()));
                if slice_used >= self.context.config.rr_timeslice {
                    debug!(processor = id, pid, slice_used, "time slice expired");
                    self.processors[id].requeue_running_process(&mut self.table);
                }
            }
        }

        self.dispatch_next(id, now);
    }

    /// Preempt when the ready head has a strictly earlier deadline
    fn schedule_edf(&mut self, id: ProcessorId, now: Tick) {
        let processor = &self.processors[id];
        if let (Some(running), Some(head)) = (processor.running(), processor.peek_ready()) {
            let deadline = |pid| self.table.get(pid).map_or(Tick::MAX, Process::deadline);
            if deadline(head) < deadline(running) {
                debug!(processor = id, running, head, "deadline preemption");
                self.processors[id].requeue_running_process(&mut self.table);
            }
        }

        self.dispatch_next(id, now);
    }

    /// If idle, pop ready processes (migrating those that qualify) until one runs
    fn dispatch_next(&mut self, id: ProcessorId, now: Tick) {
        if self.processors[id].running().is_some() {
            return;
        }

        while let Some(pid) = self.processors[id].pop_ready() {
            if let Some(target) = self.migration_target(id, pid, now) {
                if let Some(process) = self.table.get_mut(pid) {
                    self.processors[id].release_popped(process);
                }
                self.migrate_process(pid, target);
                continue;
            }

            if let Some(process) = self.table.get_mut(pid) {
                self.processors[id].run_process(process, now);
                break;
            }
        }
    }

    /// Processor type `pid` should migrate to from processor `id`, if any.
    /// Forked processes never migrate, and a process migrates at most once
    /// in its lifetime; no active target means no migration.
    fn migration_target(&self, id: ProcessorId, pid: Pid, now: Tick) -> Option<ProcessorType> {
        let process = self.table.get(pid)?;
        if process.is_forked() || process.is_migrated() {
            return None;
        }

        let config = &self.context.config;
        let target = match self.processors[id].kind() {
            ProcessorType::Fcfs if process.waited_until(now) > config.maxw => ProcessorType::Rr,
            ProcessorType::Rr if process.remaining_time() < config.rtf => ProcessorType::Sjf,
            _ => return None,
        };

        self.shortest_queue(Some(target), None).map(|_| target)
    }

    fn try_migrate_running(&mut self, id: ProcessorId, pid: Pid, now: Tick) -> bool {
        let Some(target) = self.migration_target(id, pid, now) else {
            return false;
        };
        self.processors[id].take_running(&mut self.table);
        self.migrate_process(pid, target);
        true
    }

    /// Re-dispatch `pid` to a `target` processor. The statistic is counted
    /// once per process lifetime.
    pub fn migrate_process(&mut self, pid: Pid, target: ProcessorType) {
        let first_time = self
            .table
            .get_mut(pid)
            .is_some_and(Process::mark_migrated);

        if first_time {
            let kind = match target {
                ProcessorType::Sjf => StatisticKind::MigrationRtf,
                _ => StatisticKind::MigrationMaxW,
            };
            self.stats.record_event(kind);
        }

        debug!(pid, %target, first_time, "process migrating");
        self.log_colored(format!("P{pid} migrated to {target}"), EventColor::Yellow);
        self.dispatch(pid, Some(target), None);
    }

    fn try_fork(&mut self, pid: Pid, now: Tick) {
        let can_fork = self.table.get(pid).is_some_and(Process::can_fork);
        let fork_prob = self.context.config.fork_prob;
        if can_fork && self.context.rng.roll_percent(fork_prob) {
            if let Err(err) = self.fork_process(pid, now) {
                warn!(pid, error = %err, "fork failed");
            }
        }
    }

    /// Fork a child of `parent` that runs for the parent's remaining time.
    /// Returns `None` once the parent has used both child slots.
    pub fn fork_process(&mut self, parent: Pid, now: Tick) -> SchedulerResult<Option<Pid>> {
        let process = self
            .table
            .get(parent)
            .ok_or(SchedulerError::ProcessNotFound(parent))?;
        let Some(slot) = process.forking().reserve_slot() else {
            return Ok(None);
        };

        let child_pid = self.table.next_pid();
        let child = Process::forked_from(child_pid, process, slot, now);

        if let Some(process) = self.table.get_mut(parent) {
            process.forking_mut().attach(slot, child_pid);
        }
        self.table.insert(child);
        self.stats.record_event(StatisticKind::Fork);

        info!(parent, child = child_pid, slot, now, "process forked");
        self.log_colored(format!("P{parent} forked P{child_pid}"), EventColor::Magenta);
        self.dispatch(child_pid, Some(ProcessorType::Fcfs), None);
        Ok(Some(child_pid))
    }
}
