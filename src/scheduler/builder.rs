/*!
 * Scheduler Builder
 * Builder pattern for Scheduler construction
 */

use super::Scheduler;
use crate::core::config::EngineOptions;
use crate::core::errors::LoadResult;
use crate::loader::LoadedData;
use crate::simulation::{RandomSource, SimulationContext, SimulationInfo, SimulationMode};
use std::path::PathBuf;
use tracing::info;

/// Builder for Scheduler
pub struct SchedulerBuilder {
    options: EngineOptions,
    mode: SimulationMode,
    random: Option<Box<dyn RandomSource>>,
    data: Option<LoadedData>,
    path: Option<PathBuf>,
}

impl SchedulerBuilder {
    /// Create a new Scheduler builder
    pub fn new() -> Self {
        Self {
            options: EngineOptions::default(),
            mode: SimulationMode::Silent,
            random: None,
            data: None,
            path: None,
        }
    }

    /// Engine options (seed, overheat chance, log capacity)
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the seeded random source
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    /// Load already parsed input
    pub fn with_data(mut self, data: LoadedData) -> Self {
        self.data = Some(data);
        self.path = None;
        self
    }

    /// Load input from a file when building
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self.data = None;
        self
    }

    /// Build the Scheduler. A load failure is returned, not hidden; use
    /// [`build_unloaded`](Self::build_unloaded) to keep a not-loaded scheduler instead.
    pub fn build(self) -> LoadResult<Scheduler> {
        let (mut scheduler, data, path) = self.assemble();
        if let Some(path) = path {
            scheduler.load_path(&path)?;
        } else if let Some(data) = data {
            scheduler.load_data(data)?;
        }
        Ok(scheduler)
    }

    /// Build the Scheduler, keeping it in a failed state if loading fails
    pub fn build_unloaded(self) -> Scheduler {
        let (mut scheduler, data, path) = self.assemble();
        // Failure is recorded in the scheduler's load status
        let _ = match (path, data) {
            (Some(path), _) => scheduler.load_path(&path),
            (None, Some(data)) => scheduler.load_data(data),
            (None, None) => Ok(()),
        };
        scheduler
    }

    fn assemble(self) -> (Scheduler, Option<LoadedData>, Option<PathBuf>) {
        let config = self
            .data
            .as_ref()
            .map(|data| data.config.clone())
            .unwrap_or_default();
        let context = match self.random {
            Some(random) => SimulationContext::with_random(config, self.options, random),
            None => SimulationContext::new(config, self.options),
        };

        info!(
            mode = %self.mode,
            seed = context.options.seed,
            overheat_permille = context.options.overheat_permille,
            "scheduler initialized"
        );

        let scheduler = Scheduler::new(context, SimulationInfo::new(self.mode));
        (scheduler, self.data, self.path)
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
