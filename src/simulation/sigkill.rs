/*!
 * Signal-Kill Schedule
 * Kill events (time, pid) consumed as the clock reaches each time
 */

use crate::core::types::{Pid, Tick};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A scheduled kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigKill {
    pub time: Tick,
    pub pid: Pid,
}

impl SigKill {
    pub const fn new(time: Tick, pid: Pid) -> Self {
        Self { time, pid }
    }
}

/// Kill events in time order (stable for equal times)
#[derive(Debug, Clone, Default)]
pub struct SigkillSchedule {
    events: VecDeque<SigKill>,
}

impl SigkillSchedule {
    pub fn new(events: impl IntoIterator<Item = SigKill>) -> Self {
        let mut events: Vec<SigKill> = events.into_iter().collect();
        events.sort_by_key(|e| e.time);
        Self {
            events: events.into(),
        }
    }

    /// Pids whose kill falls on `now`
    pub fn due(&self, now: Tick) -> Vec<Pid> {
        self.events
            .iter()
            .take_while(|e| e.time <= now)
            .filter(|e| e.time == now)
            .map(|e| e.pid)
            .collect()
    }

    /// Remove the kill for `pid` at `now` once it has been delivered
    pub fn consume(&mut self, now: Tick, pid: Pid) -> bool {
        match self.events.iter().position(|e| e.time == now && e.pid == pid) {
            Some(pos) => self.events.remove(pos).is_some(),
            None => false,
        }
    }

    /// Drop every event at or before `now`; returns the undelivered ones
    pub fn expire_through(&mut self, now: Tick) -> Vec<SigKill> {
        let mut expired = Vec::new();
        while self.events.front().is_some_and(|e| e.time <= now) {
            if let Some(event) = self.events.pop_front() {
                expired.push(event);
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SigKill> {
        self.events.iter()
    }
}
