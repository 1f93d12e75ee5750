/*!
 * Tick Driver
 * One discrete timestep across every component, in a fixed order
 */

use super::Scheduler;
use crate::core::types::{ProcessorId, Tick};
use crate::monitoring::span_tick;
use tracing::{info, warn};

impl Scheduler {
    /// Simulate the current timestep.
    ///
    /// Order: arrivals, every processor (tick, terminate/block, dispatch,
    /// accounting, overheat), undelivered kills, the I/O device, work
    /// stealing, then the clock advances. The run ends once every created
    /// process has terminated.
    pub fn update(&mut self) {
        if self.finished_at.is_some() {
            return;
        }

        let now = self.info.timestep();
        let span = span_tick(now);
        let _guard = span.enter();

        if self.processors.is_empty() {
            warn!(now, status = %self.status, "no processors configured, ending simulation");
            self.finish(now);
            return;
        }

        self.retry_unplaced();
        self.admit_arrivals(now);

        for id in 0..self.processors.len() {
            self.step_processor(id, now);
        }
        self.expire_sigkills(now);

        self.step_io_device(now);

        let stl = self.context.config.stl;
        if stl > 0 && now % stl == 0 {
            self.update_work_stealing();
        }

        self.info.notify_updated();
        span.record_terminated(self.terminated.len());

        if self.terminated.len() == self.table.created() {
            info!(now, processes = self.terminated.len(), "all processes terminated");
            self.log(format!("simulation finished at t={now}"));
            self.finish(now);
        }
    }

    fn step_processor(&mut self, id: ProcessorId, now: Tick) {
        if self.processors[id].is_stopped() {
            let delay = self.context.config.overheat_delay;
            if self.processors[id].tick_stopped(delay) {
                info!(processor = id, now, "processor recovered");
                self.log(format!("P{} recovered", id + 1));
            }
            return;
        }

        if let Some(pid) = self.processors[id].tick_running(&mut self.table) {
            let (done, wants_io) = self
                .table
                .get(pid)
                .map_or((false, false), |p| (p.is_done(), p.has_io_event()));
            if done {
                self.terminate_running_process(id, now);
            } else if wants_io {
                self.block_running_process(id);
            }
        }

        self.schedule_algo(id, now);
        self.processors[id].record_state_tick();
        self.check_overheat(id, now);
    }

    fn finish(&mut self, now: Tick) {
        self.finished_at = Some(now);
        self.info.stop();
    }
}
