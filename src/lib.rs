/*!
 * Scheduler Simulator Library
 * Deterministic discrete-event simulation of a multi-algorithm CPU scheduler
 */

pub mod core;
pub mod loader;
pub mod monitoring;
pub mod process;
pub mod processor;
pub mod scheduler;
pub mod simulation;
pub mod view;

// Re-exports
pub use crate::core::config::{EngineOptions, SimulationConfig};
pub use crate::core::errors::{LoadError, LoadResult, SchedulerError, SchedulerResult};
pub use crate::core::types::{Pid, ProcessorId, Tick};
pub use loader::{DataLoader, JsonLoader, LoadedData, TextLoader};
pub use monitoring::{init_tracing, EventColor, EventLog, StatisticKind, Statistics};
pub use process::{IoEvent, Process, ProcessSpec, ProcessState};
pub use processor::{Processor, ProcessorState, ProcessorType, StealHandle};
pub use scheduler::{Census, LoadStatus, Scheduler, SchedulerBuilder};
pub use simulation::{
    RandomSource, ScriptedRandom, SeededRandom, SigKill, SimulationContext, SimulationInfo,
    SimulationMode, SimulationState,
};
pub use view::SchedulerSnapshot;
