/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Pid, ProcessorId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Load operation result
pub type LoadResult<T> = Result<T, LoadError>;

/// Scheduler operation result
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors raised while loading a simulation input
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LoadError {
    #[error("Failed to read input: {0}")]
    #[diagnostic(
        code(load::io),
        help("Check that the input file exists and is readable.")
    )]
    Io(String),

    #[error("Malformed input at line {line}: {reason}")]
    #[diagnostic(
        code(load::parse),
        help("Expected whitespace separated integers and (request,duration) I/O pairs.")
    )]
    Parse { line: usize, reason: String },

    #[error("Invalid simulation input: {0}")]
    #[diagnostic(
        code(load::invalid),
        help("Processor counts, time slices and process attributes must be consistent.")
    )]
    Invalid(String),

    #[error("Unsupported input format: {0}")]
    #[diagnostic(
        code(load::unsupported_format),
        help("Use a plain text input file or a .json document.")
    )]
    UnsupportedFormat(String),
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse {
            line: err.line(),
            reason: err.to_string(),
        }
    }
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Process {0} not found in scheduler")]
    #[diagnostic(
        code(scheduler::process_not_found),
        help("The process may have terminated already.")
    )]
    ProcessNotFound(Pid),

    #[error("No eligible processor for process {pid} ({filter})")]
    #[diagnostic(
        code(scheduler::no_eligible_processor),
        help("Every matching processor is overheated or excluded.")
    )]
    NoEligibleProcessor { pid: Pid, filter: String },

    #[error("Forked process {child} is owned by non-FCFS processor {owner}")]
    #[diagnostic(
        code(scheduler::forked_off_fcfs),
        help("Forked children must only ever be queued on FCFS processors.")
    )]
    ForkedChildOffFcfs { child: Pid, owner: ProcessorId },

    #[error("Process {0} has no owning processor")]
    #[diagnostic(
        code(scheduler::orphan_without_owner),
        help("Only ready or running processes can be force terminated.")
    )]
    MissingOwner(Pid),

    #[error("Simulation did not finish within {0} ticks")]
    #[diagnostic(
        code(scheduler::tick_limit),
        help("Raise the tick limit or check the input for processes that never finish.")
    )]
    TickLimitExceeded(u64),

    #[error("Scheduler has no data loaded")]
    #[diagnostic(
        code(scheduler::not_loaded),
        help("Load an input file before starting the simulation.")
    )]
    NotLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization_roundtrip() {
        let err = SchedulerError::NoEligibleProcessor {
            pid: 4,
            filter: "RR".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("no_eligible_processor"));
        let back: SchedulerError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LoadError = io.into();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}
