/*!
 * Simulation Configuration
 * Policy parameters read from the input and engine knobs read from the environment
 */

use super::errors::{LoadError, LoadResult};
use super::limits::{DEFAULT_OVERHEAT_DELAY, DEFAULT_OVERHEAT_PERMILLE, DEFAULT_SEED, EVENT_LOG_CAPACITY};
use super::types::Tick;
use serde::{Deserialize, Serialize};

/// Scheduling policy parameters, as supplied by the simulation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    pub fcfs_count: u32,
    pub sjf_count: u32,
    pub rr_count: u32,
    #[serde(default)]
    pub edf_count: u32,

    /// Round-robin time slice in ticks
    pub rr_timeslice: Tick,

    /// Remaining-time threshold for RR -> SJF migration
    pub rtf: Tick,

    /// Maximum waiting time before FCFS -> RR migration
    pub maxw: Tick,

    /// Work stealing interval in ticks (0 disables stealing)
    pub stl: Tick,

    /// Fork probability in percent, rolled once per tick for running FCFS processes
    pub fork_prob: u32,

    /// Ticks a processor stays in STOP after overheating
    #[serde(default = "default_overheat_delay")]
    pub overheat_delay: Tick,
}

fn default_overheat_delay() -> Tick {
    DEFAULT_OVERHEAT_DELAY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fcfs_count: 0,
            sjf_count: 0,
            rr_count: 0,
            edf_count: 0,
            rr_timeslice: 1,
            rtf: 0,
            maxw: 0,
            stl: 0,
            fork_prob: 0,
            overheat_delay: DEFAULT_OVERHEAT_DELAY,
        }
    }
}

impl SimulationConfig {
    /// Total number of configured processors
    #[inline]
    #[must_use]
    pub fn processor_count(&self) -> u32 {
        self.fcfs_count + self.sjf_count + self.rr_count + self.edf_count
    }

    /// Reject parameter combinations the scheduler cannot run
    pub fn validate(&self) -> LoadResult<()> {
        if self.rr_count > 0 && self.rr_timeslice == 0 {
            return Err(LoadError::Invalid(
                "round-robin processors need a time slice of at least 1".into(),
            ));
        }
        if self.fork_prob > 100 {
            return Err(LoadError::Invalid(format!(
                "fork probability {} is not a percentage",
                self.fork_prob
            )));
        }
        Ok(())
    }
}

/// Engine knobs that are not part of the simulation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Seed for the deterministic random source
    pub seed: u64,

    /// Per-tick overheat chance in parts per thousand (0 disables overheating)
    pub overheat_permille: u32,

    /// Number of messages retained by the event log
    pub event_log_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            overheat_permille: DEFAULT_OVERHEAT_PERMILLE,
            event_log_capacity: EVENT_LOG_CAPACITY,
        }
    }
}

impl EngineOptions {
    /// Build options from the environment
    ///
    /// Environment variables:
    /// - SCHED_SIM_SEED: random seed (default: fixed seed)
    /// - SCHED_SIM_OVERHEAT_PERMILLE: overheat chance per tick in 1/1000
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Some(seed) = read_env("SCHED_SIM_SEED") {
            options.seed = seed;
        }
        if let Some(permille) = read_env("SCHED_SIM_OVERHEAT_PERMILLE") {
            options.overheat_permille = permille.min(1000) as u32;
        }

        options
    }

    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_overheat_permille(mut self, permille: u32) -> Self {
        self.overheat_permille = permille.min(1000);
        self
    }
}

fn read_env(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_timeslice() {
        let config = SimulationConfig {
            rr_count: 1,
            rr_timeslice: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_fork_probability_over_100() {
        let config = SimulationConfig {
            fcfs_count: 1,
            fork_prob: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_processor_count() {
        let config = SimulationConfig {
            fcfs_count: 2,
            sjf_count: 1,
            rr_count: 3,
            edf_count: 1,
            ..Default::default()
        };
        assert_eq!(config.processor_count(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overheat_delay_defaults_when_missing() {
        let json = r#"{"fcfs_count":1,"sjf_count":0,"rr_count":0,"rr_timeslice":2,
                       "rtf":0,"maxw":0,"stl":0,"fork_prob":0}"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.overheat_delay, DEFAULT_OVERHEAT_DELAY);
        assert_eq!(config.edf_count, 0);
    }
}
