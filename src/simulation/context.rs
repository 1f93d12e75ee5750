/*!
 * Simulation Context
 * Shared per-run state handed to the scheduler instead of global singletons
 */

use super::random::{RandomSource, SeededRandom};
use super::sigkill::SigkillSchedule;
use crate::core::config::{EngineOptions, SimulationConfig};
use crate::monitoring::EventLog;

/// Configuration, random source, event log and kill schedule for one run
pub struct SimulationContext {
    pub config: SimulationConfig,
    pub options: EngineOptions,
    pub rng: Box<dyn RandomSource>,
    pub log: EventLog,
    pub sigkills: SigkillSchedule,
}

impl SimulationContext {
    /// Context seeded from `options.seed`
    pub fn new(config: SimulationConfig, options: EngineOptions) -> Self {
        let rng = Box::new(SeededRandom::new(options.seed));
        Self::with_random(config, options, rng)
    }

    pub fn with_random(
        config: SimulationConfig,
        options: EngineOptions,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            log: EventLog::new(options.event_log_capacity),
            config,
            options,
            rng,
            sigkills: SigkillSchedule::default(),
        }
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(SimulationConfig::default(), EngineOptions::default())
    }
}

impl std::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("log_len", &self.log.len())
            .field("sigkills", &self.sigkills.len())
            .finish_non_exhaustive()
    }
}
