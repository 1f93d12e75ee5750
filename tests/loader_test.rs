/*!
 * Loader Tests
 * Input files on disk, format selection and failed loads
 */

use pretty_assertions::assert_eq;
use sched_sim::{
    DataLoader, JsonLoader, LoadError, LoadStatus, LoadedData, Scheduler, SimulationState,
    TextLoader,
};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const INPUT: &str = "\
1 0 0
2
0 0 0 0
2
0 1 5 0
1 2 3 1 (1,2)
2 1
";

fn write_input(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_text_file_loads_and_runs() {
    let file = write_input(".txt", INPUT);

    let mut sched = Scheduler::builder()
        .with_input_path(file.path())
        .build()
        .unwrap();
    assert_eq!(
        sched.status(),
        &LoadStatus::Loaded {
            processes: 2,
            processors: 1
        }
    );

    // The kill at t=2 lands on P1 while it runs; P2 then gets the CPU
    sched.run_until_finished(100).unwrap();
    assert_eq!(sched.terminated(), &[1, 2]);
    assert_eq!(sched.statistics().entries()[1].io_duration, 2);
}

#[test]
fn test_json_file_matches_text_file() {
    let text = TextLoader.load_str(INPUT).unwrap();
    let json = serde_json::to_string(&text).unwrap();
    let file = write_input(".json", &json);

    let loaded = JsonLoader.load_path(file.path()).unwrap();
    assert_eq!(loaded, text);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");

    let err = Scheduler::builder().with_input_path(&path).build().unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_unsupported_extension() {
    let file = write_input(".yaml", INPUT);
    let err = Scheduler::builder()
        .with_input_path(file.path())
        .build()
        .unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(_)));
}

#[test]
fn test_failed_load_ends_run_on_first_update() {
    let file = write_input(".txt", "1 0 0\n1\n");

    let mut sched = Scheduler::builder()
        .with_input_path(file.path())
        .build_unloaded();
    assert!(matches!(sched.status(), LoadStatus::Failed(LoadError::Parse { .. })));
    assert!(sched.status().to_string().starts_with("file failed to load"));

    sched.info_mut().start();
    sched.update();
    assert!(sched.is_finished());
    assert_eq!(sched.info().state(), SimulationState::Stopped);
}

#[test]
fn test_invalid_data_is_rejected() {
    let mut data = TextLoader.load_str(INPUT).unwrap();
    data.processes[1].pid = 1;

    let mut sched = Scheduler::builder().build().unwrap();
    assert!(matches!(sched.load_data(data), Err(LoadError::Invalid(_))));
    assert!(!sched.status().is_loaded());
}

#[test]
fn test_reload_replaces_population() {
    let data = TextLoader.load_str(INPUT).unwrap();
    let mut sched = Scheduler::builder().with_data(data).build().unwrap();
    sched.run_until_finished(100).unwrap();
    assert_eq!(sched.terminated().len(), 2);

    let mut smaller: LoadedData = TextLoader.load_str(INPUT).unwrap();
    smaller.processes.truncate(1);
    smaller.sigkills.clear();
    sched.load_data(smaller).unwrap();

    assert!(!sched.is_finished());
    assert!(sched.terminated().is_empty());
    assert_eq!(sched.total_processes(), 1);
    assert_eq!(sched.statistics().process_count(), 0);
}
