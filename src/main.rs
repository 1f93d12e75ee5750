/*!
 * Scheduler Simulator - Main Entry Point
 *
 * Loads a simulation input, drives the scheduler according to the selected
 * mode and writes the statistics report when every process has terminated.
 */

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use sched_sim::core::limits::DEFAULT_TICK_LIMIT;
use sched_sim::{
    init_tracing, EngineOptions, LoadStatus, Scheduler, SchedulerSnapshot, SimulationMode,
};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Number of log lines shown under each rendered tick
const RENDER_LOG_LINES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Advance one tick per Enter key press
    Interactive,
    /// Advance one tick per second
    Step,
    /// Run to completion without pacing
    Silent,
}

impl From<ModeArg> for SimulationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Interactive => SimulationMode::Interactive,
            ModeArg::Step => SimulationMode::StepByStep,
            ModeArg::Silent => SimulationMode::Silent,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "sched-sim", version, about = "Multi-algorithm CPU scheduler simulator")]
struct Opts {
    /// Simulation input, plain text or .json.
    input: PathBuf,

    /// How ticks are triggered.
    #[clap(short = 'm', long, value_enum, default_value = "silent")]
    mode: ModeArg,

    /// Seed for fork and overheat rolls. Identical seeds replay identical runs.
    #[clap(short = 's', long, env = "SCHED_SIM_SEED")]
    seed: Option<u64>,

    /// Per-tick overheat chance in parts per thousand. 0 disables overheating.
    #[clap(long, env = "SCHED_SIM_OVERHEAT_PERMILLE")]
    overheat_permille: Option<u32>,

    /// Where to write the statistics report.
    #[clap(short = 'o', long, default_value = "output.txt")]
    stats: PathBuf,

    /// Print the final state as JSON on stdout.
    #[clap(long)]
    json: bool,

    /// Do not render the state after each tick.
    #[clap(short = 'q', long)]
    quiet: bool,

    /// Give up after this many ticks.
    #[clap(long, default_value_t = DEFAULT_TICK_LIMIT)]
    tick_limit: u64,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let opts = Opts::parse();

    let mut options = EngineOptions::from_env();
    if let Some(seed) = opts.seed {
        options = options.with_seed(seed);
    }
    if let Some(permille) = opts.overheat_permille {
        options = options.with_overheat_permille(permille);
    }

    let mode = SimulationMode::from(opts.mode);
    let mut scheduler = Scheduler::builder()
        .with_options(options)
        .with_mode(mode)
        .with_input_path(&opts.input)
        .build_unloaded();

    if let LoadStatus::Failed(err) = scheduler.status() {
        eprintln!("{:?}", miette::Report::new(err.clone()));
    }

    info!(input = %opts.input.display(), status = %scheduler.status(), "starting simulation");
    scheduler.info_mut().start();
    run(&mut scheduler, &opts)?;

    if !scheduler.status().is_loaded() {
        bail!("{}: {}", opts.input.display(), scheduler.status());
    }

    let file = File::create(&opts.stats)
        .with_context(|| format!("creating {}", opts.stats.display()))?;
    let mut writer = BufWriter::new(file);
    scheduler.write_statistics(&mut writer)?;
    writer.flush()?;
    info!(path = %opts.stats.display(), "statistics written");

    if opts.json {
        let snapshot = SchedulerSnapshot::capture(&scheduler, RENDER_LOG_LINES);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

/// Host loop: tick whenever the simulation info allows it
fn run(scheduler: &mut Scheduler, opts: &Opts) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut ticks = 0u64;

    while !scheduler.is_finished() {
        if ticks >= opts.tick_limit {
            bail!("simulation did not finish within {} ticks", opts.tick_limit);
        }

        match scheduler.info().can_update_scheduler() {
            Some(delay) => {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                scheduler.update();
                ticks += 1;

                if !opts.quiet && scheduler.info().mode() != SimulationMode::Silent {
                    print!("{}", SchedulerSnapshot::capture(scheduler, RENDER_LOG_LINES).render());
                    io::stdout().flush()?;
                }
            }
            None if scheduler.info().mode() == SimulationMode::Interactive => {
                print!("[Enter] next tick, [q] quit > ");
                io::stdout().flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 || line.trim() == "q" {
                    scheduler.info_mut().stop();
                    break;
                }
                scheduler.info_mut().request_step();
            }
            None => break,
        }
    }
    Ok(())
}
