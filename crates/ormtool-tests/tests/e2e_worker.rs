//! Background worker tests.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ormtool-tests --test e2e_worker
//! ```

use std::thread;
use std::time::Duration;

use tempfile::tempdir;

use ormtool_pack::{PackError, PackWorker, WorkerError};
use ormtool_tests::fixtures::SourceSet;
use ormtool_tests::harness::decode_png;

#[test]
fn worker_packs_scenario_in_background() {
    let dir = tempdir().unwrap();
    let sources = SourceSet::scenario_2x2(dir.path());

    let mut worker = PackWorker::new();
    worker.start(sources.request(dir.path())).unwrap();
    while worker.is_busy() {
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(worker.progress(), 1.0);
    assert!(worker.take_results_available());
    let summary = worker.wait().unwrap().unwrap();
    assert_eq!(summary.outputs.len(), 2);
    assert_eq!(
        decode_png(&dir.path().join("orm_unreal.png")).data,
        vec![10, 1, 200, 20, 2, 210, 30, 3, 220, 40, 4, 230]
    );
}

#[test]
fn second_start_is_rejected_while_running() {
    let dir = tempdir().unwrap();
    let sources = SourceSet::ramps(dir.path(), 1024, 1024);
    let out_a = dir.path().join("a");
    let out_b = dir.path().join("b");

    let mut worker = PackWorker::new();
    worker.start(sources.request(&out_a)).unwrap();
    let second = worker.start(sources.request(&out_b));
    assert!(matches!(second, Err(WorkerError::Busy)));

    assert!(worker.wait().unwrap().is_ok());
    assert!(out_a.join("orm_unity.png").exists());
    assert!(!out_b.exists());
}

#[test]
fn cancel_yields_cancelled_without_files() {
    let dir = tempdir().unwrap();
    let sources = SourceSet::ramps(dir.path(), 1024, 1024);
    let out = dir.path().join("out");

    let mut worker = PackWorker::new();
    worker.start(sources.request(&out)).unwrap();
    worker.cancel();

    let outcome = worker.wait().unwrap();
    assert!(matches!(outcome, Err(PackError::Cancelled)));
    assert!(!worker.take_results_available());
    assert!(!out.exists());
}

#[test]
fn failed_run_clears_busy_without_results() {
    let dir = tempdir().unwrap();
    let sources = SourceSet::mismatched(dir.path());

    let mut worker = PackWorker::new();
    worker.start(sources.request(dir.path())).unwrap();
    let outcome = worker.wait().unwrap();

    assert!(matches!(outcome, Err(PackError::SizeMismatch { .. })));
    assert!(!worker.is_busy());
    assert!(!worker.take_results_available());
}

#[test]
fn outcome_is_taken_once() {
    let dir = tempdir().unwrap();
    let sources = SourceSet::scenario_2x2(dir.path());

    let mut worker = PackWorker::new();
    worker.start(sources.request(dir.path())).unwrap();
    while worker.is_busy() {
        thread::sleep(Duration::from_millis(5));
    }

    assert!(worker.take_outcome().is_some());
    assert!(worker.take_outcome().is_none());
}
