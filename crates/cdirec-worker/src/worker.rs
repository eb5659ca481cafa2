use std::path::Path;

use cdirec_backend::BackendHandle;
use cdirec_config::{DeviceSpec, RunConfig};
use cdirec_utils::CdiError;

/// One reconstruction's solver.
///
/// The lifecycle driver calls these in order and stops at the first failure;
/// `release` is always called last.
pub trait Worker {
    /// Bind a compute device. A negative status means acquisition failed.
    fn acquire_device(&mut self, device: &DeviceSpec) -> i32;

    /// Prepare numeric state, seeding from `seed_dir` when given.
    fn initialize(&mut self, seed_dir: Option<&Path>) -> Result<(), CdiError>;

    /// Run the solve to completion.
    ///
    /// `Ok(0)` is convergence, `Ok(nonzero)` a solve that did not converge.
    /// `Err` is reserved for the worker itself breaking.
    fn iterate(&mut self) -> Result<i32, CdiError>;

    /// Persist results into `save_dir`.
    fn save(&mut self, save_dir: &Path) -> Result<(), CdiError>;

    /// Free the device and numeric state. Must be idempotent and a no-op
    /// when nothing is held.
    fn release(&mut self);
}

impl<W: Worker + ?Sized> Worker for Box<W> {
    fn acquire_device(&mut self, device: &DeviceSpec) -> i32 {
        (**self).acquire_device(device)
    }

    fn initialize(&mut self, seed_dir: Option<&Path>) -> Result<(), CdiError> {
        (**self).initialize(seed_dir)
    }

    fn iterate(&mut self) -> Result<i32, CdiError> {
        (**self).iterate()
    }

    fn save(&mut self, save_dir: &Path) -> Result<(), CdiError> {
        (**self).save(save_dir)
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Builds a worker in state `Created`.
pub trait WorkerFactory {
    type Worker: Worker;

    fn create(
        &self,
        config: &RunConfig,
        data_path: &Path,
        backend: &BackendHandle,
    ) -> Result<Self::Worker, CdiError>;
}
