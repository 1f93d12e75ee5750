/*!
 * Balancing
 * Overheating with evacuation, and greedy work stealing between the most
 * and least loaded processors
 */

use super::Scheduler;
use crate::core::limits::STEAL_LIMIT_THRESHOLD;
use crate::core::types::{ProcessorId, Tick};
use crate::monitoring::{EventColor, StatisticKind};
use crate::processor::ProcessorType;
use tracing::{debug, info, warn};

impl Scheduler {
    /// Whether processor `id` may overheat without stranding work.
    /// Evaluated while `id` is still active.
    pub fn can_processor_overheat(&self, id: ProcessorId) -> bool {
        let Some(processor) = self.processors.get(id) else {
            return false;
        };
        if processor.is_stopped() {
            return false;
        }

        let others_active = self
            .processors
            .iter()
            .filter(|p| p.id() != id && !p.is_stopped())
            .count();
        if others_active == 0 {
            return false;
        }

        let active = |kind: ProcessorType| {
            self.processors
                .iter()
                .filter(|p| p.kind() == kind && !p.is_stopped())
                .count()
        };

        match processor.kind() {
            // FCFS migrates into RR
            ProcessorType::Rr => !(active(ProcessorType::Rr) == 1 && active(ProcessorType::Fcfs) > 0),
            // RR migrates into SJF
            ProcessorType::Sjf => !(active(ProcessorType::Sjf) == 1 && active(ProcessorType::Rr) > 0),
            // Forked children cannot leave FCFS
            ProcessorType::Fcfs => !processor.holds_forked(&self.table),
            ProcessorType::Edf => true,
        }
    }

    /// Roll the overheat chance for processor `id`
    pub(crate) fn check_overheat(&mut self, id: ProcessorId, now: Tick) {
        let permille = self.context.options.overheat_permille;
        if permille == 0 || !self.context.rng.roll_permille(permille) {
            return;
        }
        self.overheat_processor(id, now);
    }

    /// Put processor `id` in STOP and redistribute everything it held.
    /// Returns false, leaving the processor untouched, when it may not
    /// overheat.
    pub(crate) fn overheat_processor(&mut self, id: ProcessorId, now: Tick) -> bool {
        if !self.can_processor_overheat(id) {
            debug!(processor = id, "overheat suppressed");
            return false;
        }
        let Some(processor) = self.processors.get_mut(id) else {
            return false;
        };
        processor.overheat();
        let kind = processor.kind();
        let evacuated = processor.drain_all(&mut self.table);

        warn!(processor = id, now, evacuated = evacuated.len(), "processor overheated");
        self.log_colored(format!("{kind} P{} overheated", id + 1), EventColor::Red);

        for pid in evacuated {
            self.dispatch(pid, None, Some(id));
        }
        true
    }

    /// Move processes from the most loaded to the least loaded processor
    /// while their relative imbalance exceeds the threshold
    pub fn update_work_stealing(&mut self) {
        let mut max: Option<(ProcessorId, Tick)> = None;
        let mut min: Option<(ProcessorId, Tick)> = None;
        for processor in self.processors.iter().filter(|p| !p.is_stopped()) {
            let load = processor.concurrent_timer(false, &self.table);
            if max.map_or(true, |(_, m)| load > m) {
                max = Some((processor.id(), load));
            }
            if min.map_or(true, |(_, m)| load < m) {
                min = Some((processor.id(), load));
            }
        }

        let (Some((max_id, _)), Some((min_id, _))) = (max, min) else {
            return;
        };
        if max_id == min_id {
            return;
        }

        loop {
            let max_load = self.processors[max_id].concurrent_timer(false, &self.table);
            let min_load = self.processors[min_id].concurrent_timer(false, &self.table);
            if max_load == 0 || max_load <= min_load {
                break;
            }

            let steal_limit = (max_load - min_load) as f64 / max_load as f64;
            if steal_limit <= STEAL_LIMIT_THRESHOLD {
                break;
            }

            let Some(handle) = self.processors[max_id].steal_handle(&self.table) else {
                break;
            };
            let Some(pid) = self.processors[max_id].execute_steal(handle, &mut self.table) else {
                break;
            };
            let Some(process) = self.table.get_mut(pid) else {
                break;
            };

            self.processors[min_id].queue_process(process);
            if process.mark_stolen() {
                self.stats.record_event(StatisticKind::WorkSteal);
            }

            info!(pid, from = max_id, to = min_id, steal_limit, "process stolen");
            self.log(format!("P{pid} stolen from P{} to P{}", max_id + 1, min_id + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        EngineOptions, LoadedData, ProcessSpec, ProcessorState, Scheduler, ScriptedRandom,
        SimulationConfig,
    };

    fn scheduler(config: SimulationConfig, processes: Vec<ProcessSpec>) -> Scheduler {
        let data = LoadedData {
            config,
            processes,
            sigkills: vec![],
        };
        Scheduler::builder()
            .with_options(EngineOptions::default().with_overheat_permille(0))
            .with_random(ScriptedRandom::never())
            .with_data(data)
            .build()
            .unwrap()
    }

    #[test]
    fn test_overheat_unknown_processor_is_ignored() {
        let config = SimulationConfig {
            fcfs_count: 2,
            ..Default::default()
        };
        let mut sched = scheduler(config, vec![]);
        assert!(!sched.overheat_processor(7, 0));
        assert!(sched.processors().iter().all(|p| !p.is_stopped()));
    }

    #[test]
    fn test_overheat_respects_guard() {
        let config = SimulationConfig {
            sjf_count: 1,
            ..Default::default()
        };
        let mut sched = scheduler(config, vec![ProcessSpec::new(1, 0, 5)]);
        sched.info_mut().start();
        sched.update();

        // The only active processor keeps its work
        assert!(!sched.overheat_processor(0, 1));
        let sjf = sched.processor(0).unwrap();
        assert_eq!(sjf.state(), ProcessorState::Busy);
        assert_eq!(sjf.running(), Some(1));
    }

    #[test]
    fn test_overheat_evacuates_to_other_processor() {
        let config = SimulationConfig {
            sjf_count: 2,
            ..Default::default()
        };
        let mut sched = scheduler(config, vec![ProcessSpec::new(1, 0, 5)]);
        sched.info_mut().start();
        sched.update();

        assert!(sched.overheat_processor(0, 1));
        assert!(sched.processor(0).unwrap().is_stopped());
        assert_eq!(sched.process(1).unwrap().owner(), Some(1));
    }
}
