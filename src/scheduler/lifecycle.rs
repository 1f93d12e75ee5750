/*!
 * Process Lifecycle
 * Termination with cascading orphan kills, blocking, and signal kills
 */

use super::Scheduler;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::monitoring::{EventColor, StatisticKind};
use crate::process::ProcessState;
use crate::processor::ProcessorType;
use tracing::{debug, error, info};

impl Scheduler {
    /// Remove the running process of `id` and terminate it
    pub(crate) fn terminate_running_process(&mut self, id: ProcessorId, now: Tick) {
        if let Some(pid) = self.processors[id].take_running(&mut self.table) {
            if let Err(err) = self.notify_process_terminated(pid, now) {
                error!(pid, processor = id, error = %err, "termination failed");
            }
        }
    }

    /// Remove the running process of `id` and send it to the I/O queue
    pub(crate) fn block_running_process(&mut self, id: ProcessorId) {
        if let Some(pid) = self.processors[id].take_running(&mut self.table) {
            self.notify_process_blocked(pid);
        }
    }

    /// Record `pid` as terminated at `now`, detach it from its parent,
    /// kill its remaining children and destroy it.
    ///
    /// The caller must already have removed `pid` from its container.
    pub fn notify_process_terminated(&mut self, pid: Pid, now: Tick) -> SchedulerResult<()> {
        let mut process = self
            .table
            .remove(pid)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;

        if process.state() != ProcessState::Orphan {
            process.set_state(ProcessState::Terminated);
        }
        process.set_owner(None);
        process.finish(now);

        self.terminated.push(pid);
        self.stats.record_terminated(&process);

        if let Some(link) = process.forking().parent_link() {
            if let Some(parent) = self.table.get_mut(link.parent) {
                parent.forking_mut().detach(link.slot, pid);
            }
        }

        info!(
            pid,
            now,
            state = %process.state(),
            turnaround = process.turnaround_duration().unwrap_or(0),
            "process terminated"
        );
        self.log_colored(format!("P{pid} terminated"), EventColor::Green);

        let children = process.forking_mut().take_children();
        let mut result = Ok(());
        for child in children {
            if let Err(err) = self.kill_orphan(child, now) {
                error!(parent = pid, child, error = %err, "orphan cleanup failed");
                self.log_colored(format!("orphan P{child}: {err}"), EventColor::Red);
                result = Err(err);
            }
        }
        result
    }

    /// Send `pid` to the blocked FIFO
    pub fn notify_process_blocked(&mut self, pid: Pid) {
        if let Some(process) = self.table.get_mut(pid) {
            process.set_state(ProcessState::Blocked);
            process.set_owner(None);
        }
        debug!(pid, "process blocked on I/O");
        self.log_colored(format!("P{pid} blocked for I/O"), EventColor::Blue);
        self.blocked.push_back(pid);
    }

    /// Mark a forked child whose parent terminated as ORPH and terminate it
    /// through the FCFS processor that owns it
    fn kill_orphan(&mut self, child: Pid, now: Tick) -> SchedulerResult<()> {
        let process = self
            .table
            .get_mut(child)
            .ok_or(SchedulerError::ProcessNotFound(child))?;
        process.forking_mut().clear_link();
        process.set_state(ProcessState::Orphan);

        match process.owner() {
            Some(owner) if self.processors[owner].kind() == ProcessorType::Fcfs => {
                self.remove_from_processor(owner, child);
            }
            Some(owner) => {
                return Err(SchedulerError::ForkedChildOffFcfs { child, owner });
            }
            None => {
                let position = self.unplaced.iter().position(|u| u.pid == child);
                match position {
                    Some(index) => {
                        self.unplaced.remove(index);
                    }
                    None => return Err(SchedulerError::MissingOwner(child)),
                }
            }
        }

        debug!(child, now, "orphan killed");
        self.notify_process_terminated(child, now)
    }

    /// Take `pid` out of processor `id`, running slot or ready structure
    fn remove_from_processor(&mut self, id: ProcessorId, pid: Pid) -> bool {
        let processor = &mut self.processors[id];
        if processor.running() == Some(pid) {
            processor.take_running(&mut self.table);
            true
        } else {
            processor.remove_ready(pid, &mut self.table)
        }
    }

    /// Kill every process due at `now` that FCFS processor `id` holds
    pub(crate) fn deliver_sigkills(&mut self, id: ProcessorId, now: Tick) {
        for pid in self.context.sigkills.due(now) {
            if !self.processors[id].holds(pid) {
                continue;
            }

            self.context.sigkills.consume(now, pid);
            self.remove_from_processor(id, pid);
            if let Some(process) = self.table.get_mut(pid) {
                process.mark_killed();
            }
            self.stats.record_event(StatisticKind::Kill);

            info!(pid, processor = id, now, "process killed");
            self.log_colored(format!("P{pid} killed by signal"), EventColor::Red);
            if let Err(err) = self.notify_process_terminated(pid, now) {
                error!(pid, error = %err, "kill cleanup failed");
            }
        }
    }

    /// Drop kills due by `now` that no FCFS processor delivered
    pub(crate) fn expire_sigkills(&mut self, now: Tick) {
        for kill in self.context.sigkills.expire_through(now) {
            debug!(pid = kill.pid, time = kill.time, "kill signal not delivered");
        }
    }
}
