/*!
 * Data Loaders
 * Turn a simulation input into processor counts, process specs and kill events
 */

mod json;
mod text;

pub use json::JsonLoader;
pub use text::TextLoader;

use crate::core::config::SimulationConfig;
use crate::core::errors::{LoadError, LoadResult};
use crate::process::ProcessSpec;
use crate::simulation::SigKill;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a scheduler needs to start a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedData {
    pub config: SimulationConfig,
    pub processes: Vec<ProcessSpec>,
    #[serde(default)]
    pub sigkills: Vec<SigKill>,
}

impl LoadedData {
    /// Check the input is self-consistent
    pub fn validate(&self) -> LoadResult<()> {
        self.config.validate()?;

        let mut seen = AHashSet::with_capacity(self.processes.len());
        for spec in &self.processes {
            if !seen.insert(spec.pid) {
                return Err(LoadError::Invalid(format!("duplicate pid {}", spec.pid)));
            }
            if spec.cpu_time == 0 {
                return Err(LoadError::Invalid(format!(
                    "process {} has a zero CPU time",
                    spec.pid
                )));
            }
            if spec.io_events.windows(2).any(|w| w[1].request_time < w[0].request_time) {
                return Err(LoadError::Invalid(format!(
                    "process {} has I/O requests out of order",
                    spec.pid
                )));
            }
        }
        Ok(())
    }
}

/// Source of simulation input
pub trait DataLoader {
    /// Parse an in-memory document
    fn load_str(&self, input: &str) -> LoadResult<LoadedData>;

    /// Read and parse a file
    fn load_path(&self, path: &Path) -> LoadResult<LoadedData> {
        let input = std::fs::read_to_string(path)?;
        self.load_str(&input)
    }
}

/// Loader matching the file extension: `.json` is JSON, anything else text
pub fn loader_for_path(path: &Path) -> LoadResult<Box<dyn DataLoader>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Box::new(JsonLoader)),
        Some("txt") | None => Ok(Box::new(TextLoader)),
        Some(other) => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Load and validate `path` with the loader its extension selects
pub fn load_file(path: &Path) -> LoadResult<LoadedData> {
    let data = loader_for_path(path)?.load_path(path)?;
    data.validate()?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_selection() {
        assert!(loader_for_path(Path::new("input.txt")).is_ok());
        assert!(loader_for_path(Path::new("input")).is_ok());
        assert!(loader_for_path(Path::new("input.json")).is_ok());
        assert!(matches!(
            loader_for_path(Path::new("input.yaml")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_pid() {
        let data = LoadedData {
            config: SimulationConfig {
                fcfs_count: 1,
                ..Default::default()
            },
            processes: vec![ProcessSpec::new(1, 0, 3), ProcessSpec::new(1, 2, 3)],
            sigkills: vec![],
        };
        assert!(matches!(data.validate(), Err(LoadError::Invalid(_))));
    }
}
