/*!
 * Process Table
 * Arena of live processes addressed by pid handles
 */

use super::control::Process;
use crate::core::types::Pid;
use ahash::AHashMap;

/// Owns every live process. Containers elsewhere hold only pids.
#[derive(Debug, Default)]
pub struct ProcessTable {
    processes: AHashMap<Pid, Process>,
    highest_pid: Pid,
    created: usize,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a process; returns the replaced entry if the pid was already live
    pub fn insert(&mut self, process: Process) -> Option<Process> {
        let pid = process.pid();
        self.highest_pid = self.highest_pid.max(pid);
        self.created += 1;
        self.processes.insert(pid, process)
    }

    #[inline]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    /// Destroy a process
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        self.processes.remove(&pid)
    }

    /// Pid for the next forked process
    pub fn next_pid(&self) -> Pid {
        self.highest_pid + 1
    }

    /// Number of live processes
    #[inline]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes ever inserted, including destroyed ones
    #[inline]
    pub fn created(&self) -> usize {
        self.created
    }

    /// Remaining time of a live process, zero if it is gone
    #[inline]
    pub fn remaining_time(&self, pid: Pid) -> u64 {
        self.get(pid).map_or(0, Process::remaining_time)
    }

    /// Live processes in pid order
    pub fn iter_sorted(&self) -> Vec<&Process> {
        let mut all: Vec<&Process> = self.processes.values().collect();
        all.sort_by_key(|p| p.pid());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pid_follows_highest() {
        let mut table = ProcessTable::new();
        table.insert(Process::new(3, 0, 1, 1, []));
        table.insert(Process::new(7, 0, 1, 1, []));
        assert_eq!(table.next_pid(), 8);

        table.remove(7);
        assert_eq!(table.next_pid(), 8);
        assert_eq!(table.len(), 1);
        assert_eq!(table.created(), 2);
    }

    #[test]
    fn test_remaining_time_of_missing_pid() {
        let table = ProcessTable::new();
        assert_eq!(table.remaining_time(42), 0);
    }
}
