/*!
 * Tick Benchmarks
 * Full runs across processor mixes, and the text loader on a large input
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sched_sim::{
    DataLoader, EngineOptions, LoadedData, ProcessSpec, Scheduler, SimulationConfig, TextLoader,
};

fn workload(processes: u32) -> Vec<ProcessSpec> {
    (1..=processes)
        .map(|pid| {
            let at = u64::from(pid % 50);
            let ct = 5 + u64::from(pid * 13 % 40);
            let spec = ProcessSpec::new(pid, at, ct).with_deadline(at + ct * 3);
            if pid % 3 == 0 {
                spec.with_io(ct / 2, 4)
            } else {
                spec
            }
        })
        .collect()
}

fn mixed_config() -> SimulationConfig {
    SimulationConfig {
        fcfs_count: 2,
        sjf_count: 2,
        rr_count: 2,
        edf_count: 1,
        rr_timeslice: 4,
        rtf: 6,
        maxw: 20,
        stl: 10,
        fork_prob: 5,
        overheat_delay: 8,
    }
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for &count in &[50u32, 200, 800] {
        let data = LoadedData {
            config: mixed_config(),
            processes: workload(count),
            sigkills: vec![],
        };
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| {
                let mut scheduler = Scheduler::builder()
                    .with_options(EngineOptions::default().with_seed(7))
                    .with_data(data.clone())
                    .build()
                    .unwrap();
                black_box(scheduler.run_until_finished(1_000_000).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_work_stealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("work_stealing");

    let config = SimulationConfig {
        fcfs_count: 8,
        stl: 1,
        ..Default::default()
    };
    let data = LoadedData {
        config,
        processes: workload(400),
        sigkills: vec![],
    };

    group.bench_function("stl_every_tick", |b| {
        b.iter(|| {
            let mut scheduler = Scheduler::builder()
                .with_options(EngineOptions::default().with_overheat_permille(0))
                .with_data(data.clone())
                .build()
                .unwrap();
            black_box(scheduler.run_until_finished(1_000_000).unwrap())
        });
    });

    group.finish();
}

fn bench_text_loader(c: &mut Criterion) {
    let mut input = String::from("2 2 2 1\n4\n6 20 10 5 8\n1000\n");
    for spec in workload(1000) {
        let io: Vec<String> = spec
            .io_events
            .iter()
            .map(|io| format!("({},{})", io.request_time, io.duration))
            .collect();
        input.push_str(&format!(
            "{} {} {} {} {} {}\n",
            spec.arrival_time,
            spec.pid,
            spec.cpu_time,
            spec.effective_deadline(),
            io.len(),
            io.join(",")
        ));
    }

    let mut group = c.benchmark_group("text_loader");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("1000_processes", |b| {
        b.iter(|| TextLoader.load_str(black_box(&input)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_full_run, bench_work_stealing, bench_text_loader);
criterion_main!(benches);
