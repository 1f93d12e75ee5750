/*!
 * Scheduler Invariant Tests
 * Property tests over random inputs and seeds
 */

use proptest::prelude::*;
use sched_sim::{
    EngineOptions, LoadedData, ProcessSpec, ProcessState, ProcessorType, Scheduler, SigKill,
    SimulationConfig,
};
use std::collections::HashSet;

const TICK_LIMIT: u64 = 100_000;

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    (
        (1u32..=2, 0u32..=1, 0u32..=2, 0u32..=1),
        (1u64..=4, 0u64..=5, 0u64..=8, 0u64..=6),
        (0u32..=60, 1u64..=5),
    )
        .prop_map(
            |((fcfs, sjf, rr, edf), (rr_timeslice, rtf, maxw, stl), (fork_prob, overheat_delay))| {
                SimulationConfig {
                    fcfs_count: fcfs,
                    sjf_count: sjf,
                    rr_count: rr,
                    edf_count: edf,
                    rr_timeslice,
                    rtf,
                    maxw,
                    stl,
                    fork_prob,
                    overheat_delay,
                }
            },
        )
}

fn arb_processes() -> impl Strategy<Value = Vec<ProcessSpec>> {
    prop::collection::vec(
        (0u64..=12, 1u64..=15, prop::option::of((0u64..=3, 0u64..=4)), 0u64..=30),
        1..=8,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .zip(1u32..)
            .map(|((at, ct, io, slack), pid)| {
                let mut spec = ProcessSpec::new(pid, at, ct).with_deadline(at + ct + slack);
                if let Some((request, duration)) = io {
                    spec = spec.with_io(request.min(ct - 1), duration);
                }
                spec
            })
            .collect()
    })
}

fn arb_sigkills() -> impl Strategy<Value = Vec<SigKill>> {
    prop::collection::vec((0u64..=20, 1u32..=10), 0..=3)
        .prop_map(|kills| kills.into_iter().map(|(time, pid)| SigKill::new(time, pid)).collect())
}

fn build(data: LoadedData, seed: u64, overheat_permille: u32) -> Scheduler {
    let mut scheduler = Scheduler::builder()
        .with_options(
            EngineOptions::default()
                .with_seed(seed)
                .with_overheat_permille(overheat_permille),
        )
        .with_data(data)
        .build()
        .unwrap();
    scheduler.info_mut().start();
    scheduler
}

fn check_tick(scheduler: &Scheduler) -> Result<(), TestCaseError> {
    let census = scheduler.census();
    prop_assert_eq!(census.total(), scheduler.total_processes());

    let pids = scheduler.container_pids();
    let unique: HashSet<_> = pids.iter().copied().collect();
    prop_assert_eq!(unique.len(), pids.len());

    let unplaced: HashSet<_> = scheduler.unplaced_pids().collect();
    for process in scheduler.table().iter_sorted() {
        if !process.is_forked() {
            continue;
        }
        match process.state() {
            ProcessState::Ready | ProcessState::Running if !unplaced.contains(&process.pid()) => {
                let owner = process.owner().and_then(|id| scheduler.processor(id));
                prop_assert_eq!(owner.map(|p| p.kind()), Some(ProcessorType::Fcfs));
            }
            ProcessState::Ready => prop_assert!(unplaced.contains(&process.pid())),
            other => prop_assert!(false, "forked P{} in state {}", process.pid(), other),
        }
    }

    let active = scheduler
        .processors()
        .iter()
        .filter(|p| !p.is_stopped())
        .count();
    prop_assert!(active >= 1);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_every_process_accounted_for(
        config in arb_config(),
        processes in arb_processes(),
        sigkills in arb_sigkills(),
        seed in any::<u64>(),
        overheat_permille in 0u32..=200,
    ) {
        let data = LoadedData { config, processes, sigkills };
        let mut scheduler = build(data, seed, overheat_permille);

        let mut ticks = 0;
        while !scheduler.is_finished() {
            prop_assert!(ticks < TICK_LIMIT, "simulation did not finish");
            scheduler.update();
            check_tick(&scheduler)?;
            ticks += 1;
        }

        prop_assert_eq!(scheduler.terminated().len(), scheduler.total_processes());
        prop_assert_eq!(scheduler.statistics().process_count(), scheduler.total_processes());
        prop_assert!(scheduler.table().is_empty());
    }

    #[test]
    fn prop_same_seed_same_run(
        config in arb_config(),
        processes in arb_processes(),
        seed in any::<u64>(),
    ) {
        let data = LoadedData { config, processes, sigkills: vec![] };
        let mut first = build(data.clone(), seed, 100);
        let mut second = build(data, seed, 100);

        let end_first = first.run_until_finished(TICK_LIMIT).unwrap();
        let end_second = second.run_until_finished(TICK_LIMIT).unwrap();

        prop_assert_eq!(end_first, end_second);
        prop_assert_eq!(first.statistics().entries(), second.statistics().entries());
        prop_assert_eq!(first.terminated(), second.terminated());
    }
}
