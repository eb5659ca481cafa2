use std::path::{Path, PathBuf};

use cdirec_config::{DeviceSpec, RunConfig};
use cdirec_utils::CdiError;
use cdirec_utils::logging::StageTimer;
use cdirec_utils::types::WorkerState;
use tracing::{debug, info, warn};

use crate::worker::Worker;

/// How a driven worker ended, when no stage errored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Acquisition returned a negative status; nothing else ran.
    DeviceRejected { device: i32, status: i32 },
    /// The solve returned a nonzero status; results were not saved.
    Unsaved { status: i32 },
    /// Results were written to `save_dir`.
    Saved { save_dir: PathBuf },
}

impl LifecycleOutcome {
    /// Last state reached before the worker was cleared.
    #[must_use]
    pub fn last_state(&self) -> WorkerState {
        match self {
            Self::DeviceRejected { .. } => WorkerState::DeviceBound,
            Self::Unsaved { .. } => WorkerState::Unsaved,
            Self::Saved { .. } => WorkerState::Saved,
        }
    }

    /// Status reported by the stage that decided the outcome.
    #[must_use]
    pub fn status(&self) -> i32 {
        match self {
            Self::DeviceRejected { status, .. } | Self::Unsaved { status } => *status,
            Self::Saved { .. } => 0,
        }
    }
}

/// Device request for a run: the explicit request wins over `config.device`.
#[must_use]
pub fn choose_device(explicit: Option<&DeviceSpec>, config: &RunConfig) -> DeviceSpec {
    explicit.cloned().unwrap_or_else(|| config.device())
}

/// Releases the worker when dropped.
struct ReleaseGuard<'a, W: Worker + ?Sized> {
    worker: &'a mut W,
    state: WorkerState,
}

impl<W: Worker + ?Sized> ReleaseGuard<'_, W> {
    fn advance(&mut self, state: WorkerState) {
        debug!(from = %self.state, to = %state, "worker state");
        self.state = state;
    }
}

impl<W: Worker + ?Sized> Drop for ReleaseGuard<'_, W> {
    fn drop(&mut self) {
        self.worker.release();
        debug!(from = %self.state, to = %WorkerState::Cleared, "worker state");
    }
}

/// Drive `worker` from `Created` to `Cleared`.
///
/// Stage errors propagate after release. A negative acquisition status and a
/// nonzero solve status are outcomes, not errors.
pub fn drive_worker<W: Worker + ?Sized>(
    worker: &mut W,
    device: &DeviceSpec,
    seed_dir: Option<&Path>,
    save_dir: &Path,
) -> Result<LifecycleOutcome, CdiError> {
    let mut guard = ReleaseGuard {
        worker,
        state: WorkerState::Created,
    };

    let timer = StageTimer::start("acquire_device");
    let status = guard.worker.acquire_device(device);
    if status < 0 {
        timer.abort(&format!("device {device} rejected with status {status}"));
        return Ok(LifecycleOutcome::DeviceRejected {
            device: device.primary(),
            status,
        });
    }
    timer.complete();
    guard.advance(WorkerState::DeviceBound);

    let timer = StageTimer::start("initialize");
    if let Err(err) = guard.worker.initialize(seed_dir) {
        timer.abort(&err.to_string());
        return Err(err);
    }
    timer.complete();
    guard.advance(WorkerState::Initialized);

    let timer = StageTimer::start("iterate");
    let status = match guard.worker.iterate() {
        Ok(status) => status,
        Err(err) => {
            timer.abort(&err.to_string());
            return Err(err);
        }
    };
    guard.advance(WorkerState::Iterated);
    if status != 0 {
        timer.degrade(&format!("solve returned status {status}"));
        guard.advance(WorkerState::Unsaved);
        warn!(status, "reconstruction did not converge; skipping save");
        return Ok(LifecycleOutcome::Unsaved { status });
    }
    timer.complete();

    let timer = StageTimer::start("save");
    if let Err(err) = guard.worker.save(save_dir) {
        timer.abort(&err.to_string());
        return Err(err);
    }
    timer.complete();
    guard.advance(WorkerState::Saved);
    info!(save_dir = %save_dir.display(), "results saved");

    Ok(LifecycleOutcome::Saved {
        save_dir: save_dir.to_path_buf(),
    })
}
