/*!
 * Shared helpers for scheduler integration tests
 */

#![allow(dead_code)]

use sched_sim::{
    EngineOptions, LoadedData, Pid, ProcessSpec, Scheduler, ScriptedRandom, SigKill,
    SimulationConfig, Tick,
};
use std::collections::HashSet;

pub fn config(fcfs: u32, sjf: u32, rr: u32, edf: u32) -> SimulationConfig {
    SimulationConfig {
        fcfs_count: fcfs,
        sjf_count: sjf,
        rr_count: rr,
        edf_count: edf,
        rr_timeslice: 3,
        ..Default::default()
    }
}

/// Options with overheating disabled
pub fn calm_options() -> EngineOptions {
    EngineOptions::default().with_overheat_permille(0)
}

/// Loaded scheduler whose random rolls always fail
pub fn scheduler(
    config: SimulationConfig,
    processes: Vec<ProcessSpec>,
    sigkills: Vec<SigKill>,
) -> Scheduler {
    scheduler_with(config, processes, sigkills, ScriptedRandom::never())
}

pub fn scheduler_with(
    config: SimulationConfig,
    processes: Vec<ProcessSpec>,
    sigkills: Vec<SigKill>,
    random: ScriptedRandom,
) -> Scheduler {
    let data = LoadedData {
        config,
        processes,
        sigkills,
    };
    let mut scheduler = Scheduler::builder()
        .with_options(calm_options())
        .with_random(random)
        .with_data(data)
        .build()
        .expect("test input is valid");
    scheduler.info_mut().start();
    scheduler
}

/// Run `ticks` updates
pub fn advance(scheduler: &mut Scheduler, ticks: usize) {
    for _ in 0..ticks {
        scheduler.update();
    }
}

/// (pid, termination time) in termination order
pub fn terminations(scheduler: &Scheduler) -> Vec<(Pid, Tick)> {
    scheduler
        .statistics()
        .entries()
        .iter()
        .map(|e| (e.pid, e.termination_time))
        .collect()
}

/// Every created process sits in exactly one container
pub fn assert_conserved(scheduler: &Scheduler) {
    let census = scheduler.census();
    assert_eq!(
        census.total(),
        scheduler.total_processes(),
        "census {census:?} does not cover every process"
    );

    let pids = scheduler.container_pids();
    let unique: HashSet<Pid> = pids.iter().copied().collect();
    assert_eq!(unique.len(), pids.len(), "a pid is held twice: {pids:?}");
}
