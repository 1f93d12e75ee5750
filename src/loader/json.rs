/*!
 * JSON Loader
 */

use super::{DataLoader, LoadedData};
use crate::core::errors::LoadResult;

/// Reads a serialized [`LoadedData`] document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl DataLoader for JsonLoader {
    fn load_str(&self, input: &str) -> LoadResult<LoadedData> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::LoadError;

    #[test]
    fn test_load_minimal_document() {
        let input = r#"{
            "config": {"fcfs_count":1,"sjf_count":0,"rr_count":1,"rr_timeslice":3,
                       "rtf":2,"maxw":5,"stl":0,"fork_prob":0},
            "processes": [
                {"pid":1,"arrival_time":0,"cpu_time":5,
                 "io_events":[{"request_time":2,"duration":1}]}
            ],
            "sigkills": [{"time":4,"pid":1}]
        }"#;
        let data = JsonLoader.load_str(input).unwrap();
        assert_eq!(data.config.rr_count, 1);
        assert_eq!(data.processes[0].io_events.len(), 1);
        assert_eq!(data.sigkills[0].time, 4);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = JsonLoader.load_str("{\n\"config\": ").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }
}
