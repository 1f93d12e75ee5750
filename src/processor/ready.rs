/*!
 * Ready Structures
 * One ready structure per dispatch discipline, as a closed sum type
 */

use super::entry::Entry;
use super::types::{ProcessorType, StealSlot};
use crate::core::types::{Pid, Tick};
use std::collections::{BinaryHeap, VecDeque};

/// Variant-specific ready structure
#[derive(Debug, Clone)]
pub(super) enum ReadyQueue {
    /// Insertion-ordered list
    Fcfs(VecDeque<Pid>),
    /// Min-heap by remaining time
    Sjf(BinaryHeap<Entry>),
    /// FIFO
    Rr(VecDeque<Pid>),
    /// Min-heap by absolute deadline
    Edf(BinaryHeap<Entry>),
}

impl ReadyQueue {
    pub fn for_type(kind: ProcessorType) -> Self {
        match kind {
            ProcessorType::Fcfs => ReadyQueue::Fcfs(VecDeque::new()),
            ProcessorType::Sjf => ReadyQueue::Sjf(BinaryHeap::new()),
            ProcessorType::Rr => ReadyQueue::Rr(VecDeque::new()),
            ProcessorType::Edf => ReadyQueue::Edf(BinaryHeap::new()),
        }
    }

    /// Append at the tail (lists) or the key position (heaps)
    pub fn push(&mut self, pid: Pid, key: Tick, seq: u64) {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.push_back(pid),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap.push(Entry::new(pid, key, seq)),
        }
    }

    /// Remove the next process to dispatch
    pub fn pop(&mut self) -> Option<Pid> {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.pop_front(),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap.pop().map(|e| e.pid),
        }
    }

    /// The next process to dispatch
    pub fn peek(&self) -> Option<Pid> {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.front().copied(),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap.peek().map(|e| e.pid),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.len(),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pid: Pid) -> bool {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.contains(&pid),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap.iter().any(|e| e.pid == pid),
        }
    }

    /// Remove `pid` wherever it sits - O(n), heaps are rebuilt
    pub fn remove(&mut self, pid: Pid) -> bool {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => {
                match queue.iter().position(|&p| p == pid) {
                    Some(pos) => queue.remove(pos).is_some(),
                    None => false,
                }
            }
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => {
                let original_len = heap.len();
                heap.retain(|e| e.pid != pid);
                heap.len() < original_len
            }
        }
    }

    /// Remove the process at a steal slot if it still holds `pid`
    pub fn take_slot(&mut self, slot: StealSlot, pid: Pid) -> bool {
        match (self, slot) {
            (ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue), StealSlot::Index(index)) => {
                if queue.get(index) == Some(&pid) {
                    queue.remove(index);
                    true
                } else {
                    false
                }
            }
            (ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap), StealSlot::Top) => {
                if heap.peek().map(|e| e.pid) == Some(pid) {
                    heap.pop();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Cheapest-to-remove candidate for stealing that satisfies `stealable`.
    /// Lists are scanned from the head; heaps only offer their top.
    pub fn steal_candidate(&self, stealable: impl Fn(Pid) -> bool) -> Option<(Pid, StealSlot)> {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue
                .iter()
                .position(|&pid| stealable(pid))
                .map(|index| (queue[index], StealSlot::Index(index))),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => heap
                .peek()
                .filter(|e| stealable(e.pid))
                .map(|e| (e.pid, StealSlot::Top)),
        }
    }

    /// Empty the structure in dispatch order
    pub fn drain(&mut self) -> Vec<Pid> {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.drain(..).collect(),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => {
                std::iter::from_fn(|| heap.pop().map(|e| e.pid)).collect()
            }
        }
    }

    /// Pids in dispatch order, without mutating
    pub fn ordered(&self) -> Vec<Pid> {
        match self {
            ReadyQueue::Fcfs(queue) | ReadyQueue::Rr(queue) => queue.iter().copied().collect(),
            ReadyQueue::Sjf(heap) | ReadyQueue::Edf(heap) => {
                let mut entries: Vec<&Entry> = heap.iter().collect();
                entries.sort_by_key(|e| (e.key, e.seq));
                entries.into_iter().map(|e| e.pid).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_variants_keep_insertion_order() {
        let mut ready = ReadyQueue::for_type(ProcessorType::Rr);
        for (seq, pid) in [3, 1, 2].into_iter().enumerate() {
            ready.push(pid, 100 - pid as Tick, seq as u64);
        }
        assert_eq!(ready.ordered(), vec![3, 1, 2]);
        assert_eq!(ready.pop(), Some(3));
    }

    #[test]
    fn test_heap_variants_order_by_key() {
        let mut ready = ReadyQueue::for_type(ProcessorType::Sjf);
        ready.push(1, 10, 0);
        ready.push(2, 2, 1);
        ready.push(3, 6, 2);
        assert_eq!(ready.ordered(), vec![2, 3, 1]);
        assert_eq!(ready.drain(), vec![2, 3, 1]);
        assert!(ready.is_empty());
    }

    #[test]
    fn test_remove_from_heap() {
        let mut ready = ReadyQueue::for_type(ProcessorType::Edf);
        ready.push(1, 5, 0);
        ready.push(2, 3, 1);
        assert!(ready.remove(2));
        assert!(!ready.remove(2));
        assert_eq!(ready.peek(), Some(1));
    }

    #[test]
    fn test_steal_candidate_skips_unstealable_in_lists() {
        let mut ready = ReadyQueue::for_type(ProcessorType::Fcfs);
        ready.push(1, 0, 0);
        ready.push(2, 0, 1);
        let (pid, slot) = ready.steal_candidate(|pid| pid != 1).unwrap();
        assert_eq!(pid, 2);
        assert_eq!(slot, StealSlot::Index(1));
        assert!(ready.take_slot(slot, pid));
        assert_eq!(ready.ordered(), vec![1]);
        assert!(ready.steal_candidate(|pid| pid != 1).is_none());
    }

    #[test]
    fn test_heap_steal_candidate_is_top_only() {
        let mut ready = ReadyQueue::for_type(ProcessorType::Sjf);
        ready.push(1, 1, 0);
        ready.push(2, 5, 1);
        assert!(ready.steal_candidate(|pid| pid != 1).is_none());
        assert_eq!(ready.steal_candidate(|_| true).map(|(p, _)| p), Some(1));
    }
}
