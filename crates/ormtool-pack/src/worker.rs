//! Single-slot background pack job.
//!
//! A [`PackWorker`] owns at most one running pack. The observer (a UI loop or
//! the CLI) polls [`PackWorker::progress`] and [`PackWorker::is_busy`] and picks
//! up the result once the job is done. Dropping the worker cancels and joins
//! any job still running.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::packer::{pack, PackError, PackRequest, PackSummary};
use crate::progress::ProgressSink;

/// Errors from driving the worker itself, as opposed to the pack.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("A pack is already running")]
    Busy,

    #[error("No pack has been started")]
    NotStarted,

    #[error("Pack thread panicked")]
    Panicked,

    #[error("Failed to spawn pack thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type PackOutcome = Result<PackSummary, PackError>;

#[derive(Debug, Default)]
struct Shared {
    /// `f32` bits of the last reported progress.
    progress: AtomicU32,
    busy: AtomicBool,
    results_available: AtomicBool,
    cancel: AtomicBool,
    outcome: Mutex<Option<PackOutcome>>,
}

impl Shared {
    fn set_outcome(&self, outcome: Option<PackOutcome>) {
        let mut slot = self.outcome.lock().unwrap_or_else(|e| e.into_inner());
        *slot = outcome;
    }
}

/// Clears `busy` when the job ends, including by panic.
struct BusyGuard(Arc<Shared>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::Release);
    }
}

struct WorkerSink {
    shared: Arc<Shared>,
}

impl ProgressSink for WorkerSink {
    fn report(&mut self, progress: f32) {
        self.shared
            .progress
            .store(progress.to_bits(), Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.shared.cancel.load(Ordering::Acquire)
    }
}

/// Owner of the background pack thread.
#[derive(Debug, Default)]
pub struct PackWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl PackWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch `request` on a new thread.
    ///
    /// Returns [`WorkerError::Busy`] without touching the running job if one
    /// is still in flight.
    pub fn start(&mut self, request: PackRequest) -> Result<(), WorkerError> {
        if self.shared.busy.swap(true, Ordering::AcqRel) {
            log::debug!("pack start ignored: worker busy");
            return Err(WorkerError::Busy);
        }

        // The previous job has finished; reap it before reusing the slot.
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        self.shared.progress.store(0f32.to_bits(), Ordering::Release);
        self.shared.cancel.store(false, Ordering::Release);
        self.shared.results_available.store(false, Ordering::Release);
        self.shared.set_outcome(None);

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("ormtool-pack".into())
            .spawn(move || {
                let _guard = BusyGuard(Arc::clone(&shared));
                let mut sink = WorkerSink {
                    shared: Arc::clone(&shared),
                };

                let outcome = pack(&request, &mut sink);
                match &outcome {
                    Ok(summary) => log::debug!("pack finished: {} output(s)", summary.outputs.len()),
                    Err(e) => log::debug!("pack failed: {}", e),
                }

                let succeeded = outcome.is_ok();
                shared.set_outcome(Some(outcome));
                if succeeded {
                    shared.results_available.store(true, Ordering::Release);
                }
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.busy.store(false, Ordering::Release);
                Err(WorkerError::Spawn(e))
            }
        }
    }

    /// Latest progress value in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        f32::from_bits(self.shared.progress.load(Ordering::Acquire))
    }

    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    /// Ask the running job to stop at its next progress point.
    pub fn cancel(&self) {
        if self.is_busy() {
            log::debug!("pack cancellation requested");
            self.shared.cancel.store(true, Ordering::Release);
        }
    }

    /// `true` once per successful run; the flag is cleared by reading it.
    pub fn take_results_available(&self) -> bool {
        self.shared.results_available.swap(false, Ordering::AcqRel)
    }

    /// Take the outcome of the finished job, if any.
    pub fn take_outcome(&self) -> Option<PackOutcome> {
        if self.is_busy() {
            return None;
        }
        self.shared
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Block until the current job ends and return its outcome.
    pub fn wait(&mut self) -> Result<PackOutcome, WorkerError> {
        let handle = self.handle.take().ok_or(WorkerError::NotStarted)?;
        if handle.join().is_err() {
            return Err(WorkerError::Panicked);
        }
        self.take_outcome().ok_or(WorkerError::NotStarted)
    }
}

impl Drop for PackWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shared.cancel.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::write_grayscale;
    use crate::png::PngConfig;
    use crate::texture::GrayscaleImage;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_sources(dir: &Path, size: u32) -> (PathBuf, PathBuf, PathBuf) {
        let mut paths = Vec::new();
        for (name, value) in [("ao.png", 10u8), ("r.png", 20), ("m.png", 30)] {
            let path = dir.join(name);
            let img = GrayscaleImage::filled(size, size, value);
            write_grayscale(&img, &path, &PngConfig::fast()).unwrap();
            paths.push(path);
        }
        (paths[0].clone(), paths[1].clone(), paths[2].clone())
    }

    #[test]
    fn test_wait_without_start() {
        let mut worker = PackWorker::new();
        assert!(matches!(worker.wait(), Err(WorkerError::NotStarted)));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_successful_run_sets_results_available() {
        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 16);
        let request = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .with_unity(dir.path().join("unity.png"));

        let mut worker = PackWorker::new();
        worker.start(request).unwrap();
        let summary = worker.wait().unwrap().unwrap();

        assert_eq!(summary.outputs.len(), 2);
        assert!(!worker.is_busy());
        assert_eq!(worker.progress(), 1.0);
        assert!(worker.take_results_available());
        assert!(!worker.take_results_available());
    }

    #[test]
    fn test_failed_run_does_not_set_results_available() {
        let dir = tempdir().unwrap();
        let request = PackRequest::new(
            dir.path().join("a.png"),
            dir.path().join("b.png"),
            dir.path().join("c.png"),
        )
        .with_unreal(dir.path().join("unreal.png"));

        let mut worker = PackWorker::new();
        worker.start(request).unwrap();
        let outcome = worker.wait().unwrap();

        assert!(matches!(outcome, Err(PackError::LoadFailed { .. })));
        assert!(!worker.take_results_available());
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_untaken_success_flag_is_cleared_by_next_run() {
        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 4);
        let good = PackRequest::new(&ao, &r, &m)
            .with_unreal(dir.path().join("unreal.png"))
            .without_unity();

        let small = dir.path().join("small.png");
        write_grayscale(&GrayscaleImage::filled(2, 2, 0), &small, &PngConfig::fast()).unwrap();
        let mismatched = PackRequest::new(&ao, &small, &m)
            .with_unreal(dir.path().join("unreal2.png"))
            .without_unity();

        let mut worker = PackWorker::new();
        worker.start(good).unwrap();
        assert!(worker.wait().unwrap().is_ok());

        worker.start(mismatched).unwrap();
        let outcome = worker.wait().unwrap();
        assert!(matches!(outcome, Err(PackError::SizeMismatch { .. })));
        assert!(!worker.take_results_available());
    }

    #[test]
    fn test_second_start_while_busy_is_rejected() {
        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 8);
        let request = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .without_unity();

        let mut worker = PackWorker::new();
        // Hold the slot as if a job were running.
        worker.shared.busy.store(true, Ordering::Release);
        assert!(matches!(worker.start(request.clone()), Err(WorkerError::Busy)));
        assert!(!dir.path().join("unreal.png").exists());

        worker.shared.busy.store(false, Ordering::Release);
        worker.start(request).unwrap();
        assert!(worker.wait().unwrap().is_ok());
    }

    #[test]
    fn test_worker_can_be_reused() {
        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 4);
        let request = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .without_unity();

        let mut worker = PackWorker::new();
        worker.start(request.clone()).unwrap();
        assert!(worker.wait().unwrap().is_ok());
        worker.start(request).unwrap();
        assert!(worker.wait().unwrap().is_ok());
    }

    #[test]
    fn test_cancelled_sink_stops_pack() {
        let shared = Arc::new(Shared::default());
        shared.cancel.store(true, Ordering::Release);
        let mut sink = WorkerSink {
            shared: Arc::clone(&shared),
        };

        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 4);
        let request = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .with_unity(dir.path().join("unity.png"));

        let outcome = pack(&request, &mut sink);
        assert!(matches!(outcome, Err(PackError::Cancelled)));
        assert!(!dir.path().join("unreal.png").exists());
        assert!(!dir.path().join("unity.png").exists());
    }

    #[test]
    fn test_drop_joins_running_job() {
        let dir = tempdir().unwrap();
        let (ao, r, m) = write_sources(dir.path(), 64);
        let request = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .with_unity(dir.path().join("unity.png"));

        let mut worker = PackWorker::new();
        worker.start(request).unwrap();
        let shared = Arc::clone(&worker.shared);
        drop(worker);
        assert!(!shared.busy.load(Ordering::Acquire));
    }
}
