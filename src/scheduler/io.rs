/*!
 * I/O Device
 * The single shared device: one occupant at a time, blocked processes wait FIFO
 */

use super::Scheduler;
use crate::core::types::{Pid, Tick};
use crate::monitoring::EventColor;
use serde::Serialize;
use tracing::debug;

/// Current occupant of the I/O device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IoSlot {
    pub pid: Pid,
    pub duration: Tick,
    pub remaining: Tick,
}

impl Scheduler {
    /// Advance the device by one tick, then admit the next blocked process
    /// if the device is free
    pub(crate) fn step_io_device(&mut self, now: Tick) {
        if let Some(slot) = self.io_device.as_mut() {
            slot.remaining = slot.remaining.saturating_sub(1);
            if slot.remaining == 0 {
                self.release_io_device(now);
            }
        }

        if self.io_device.is_some() {
            return;
        }

        while let Some(pid) = self.blocked.pop_front() {
            let Some(process) = self.table.get_mut(pid) else {
                continue;
            };
            let Some(event) = process.pop_io_event() else {
                // Nothing left to do on the device; back to a processor
                self.dispatch(pid, None, None);
                continue;
            };

            debug!(pid, duration = event.duration, now, "I/O device acquired");
            self.io_device = Some(IoSlot {
                pid,
                duration: event.duration,
                remaining: event.duration,
            });
            if event.duration == 0 {
                self.release_io_device(now);
            }
            break;
        }
    }

    fn release_io_device(&mut self, now: Tick) {
        let Some(slot) = self.io_device.take() else {
            return;
        };

        if let Some(process) = self.table.get_mut(slot.pid) {
            process.add_io_time(slot.duration);
        }
        debug!(pid = slot.pid, now, "I/O device released");
        self.log_colored(
            format!("P{} finished I/O ({} ticks)", slot.pid, slot.duration),
            EventColor::Cyan,
        );
        self.dispatch(slot.pid, None, None);
    }
}
