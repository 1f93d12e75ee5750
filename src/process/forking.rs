/*!
 * Fork Tree
 *
 * Each process owns two child slots. A forked child records the parent pid and
 * the slot index it occupies, so it can detach itself in O(1) when it
 * terminates.
 */

use crate::core::limits::FORK_CHILD_SLOTS;
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Location of a child inside its parent's slot array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent: Pid,
    pub slot: usize,
}

/// Fork-tree membership of a process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkingData {
    link: Option<ParentLink>,
    forked: bool,
    children: [Option<Pid>; FORK_CHILD_SLOTS],
    fork_count: usize,
}

impl ForkingData {
    /// Fork data for a child spliced into `parent` at `slot`
    pub(crate) fn child_of(parent: Pid, slot: usize) -> Self {
        Self {
            link: Some(ParentLink { parent, slot }),
            forked: true,
            ..Default::default()
        }
    }

    /// Lifetime fork cap not yet reached
    #[inline]
    #[must_use]
    pub fn can_fork(&self) -> bool {
        self.fork_count < FORK_CHILD_SLOTS
    }

    /// Created by a fork
    #[inline]
    #[must_use]
    pub fn is_forked(&self) -> bool {
        self.forked
    }

    #[inline]
    #[must_use]
    pub fn parent_link(&self) -> Option<ParentLink> {
        self.link
    }

    #[inline]
    #[must_use]
    pub fn fork_count(&self) -> usize {
        self.fork_count
    }

    /// Children still attached to this process
    pub fn children(&self) -> impl Iterator<Item = Pid> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Reserve the next free slot for a new child. Returns the slot index,
    /// or `None` once the lifetime cap is reached.
    pub(crate) fn reserve_slot(&self) -> Option<usize> {
        if !self.can_fork() {
            return None;
        }
        self.children.iter().position(Option::is_none)
    }

    /// Store `child` in `slot` and count the fork
    pub(crate) fn attach(&mut self, slot: usize, child: Pid) {
        debug_assert!(self.children[slot].is_none());
        self.children[slot] = Some(child);
        self.fork_count += 1;
    }

    /// Clear `slot` if it holds `child`
    pub(crate) fn detach(&mut self, slot: usize, child: Pid) -> bool {
        match self.children.get_mut(slot) {
            Some(entry) if *entry == Some(child) => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the parent link (the parent is gone)
    pub(crate) fn clear_link(&mut self) {
        self.link = None;
    }

    /// Remove and return every attached child
    pub(crate) fn take_children(&mut self) -> Vec<Pid> {
        self.children.iter_mut().filter_map(Option::take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_cap_is_lifetime() {
        let mut data = ForkingData::default();
        assert!(data.can_fork());

        let slot = data.reserve_slot().unwrap();
        data.attach(slot, 10);
        let slot = data.reserve_slot().unwrap();
        data.attach(slot, 11);
        assert!(!data.can_fork());

        // Detaching a child frees the slot but not the fork budget
        assert!(data.detach(0, 10));
        assert!(!data.can_fork());
        assert_eq!(data.reserve_slot(), None);
        assert_eq!(data.children().collect::<Vec<_>>(), vec![11]);
    }

    #[test]
    fn test_detach_checks_slot_owner() {
        let mut data = ForkingData::default();
        data.attach(0, 7);
        assert!(!data.detach(0, 8));
        assert!(!data.detach(1, 7));
        assert!(data.detach(0, 7));
    }

    #[test]
    fn test_child_link() {
        let child = ForkingData::child_of(3, 1);
        assert!(child.is_forked());
        assert_eq!(child.parent_link(), Some(ParentLink { parent: 3, slot: 1 }));
    }
}
