/*!
 * Ready Queue Entry Types
 * Heap entries for the priority-ordered ready structures
 */

use crate::core::types::{Pid, Tick};
use std::cmp::Ordering;

/// Min-heap entry: smallest key first, insertion order among equal keys.
///
/// The key is the remaining time (SJF) or the absolute deadline (EDF),
/// captured when the process is queued. Neither changes while a process
/// sits in a ready structure.
#[derive(Debug, Clone, Copy)]
pub(super) struct Entry {
    pub pid: Pid,
    pub key: Tick,
    pub seq: u64,
}

impl Entry {
    pub fn new(pid: Pid, key: Tick, seq: u64) -> Self {
        Self { pid, key, seq }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so reverse both comparisons
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
