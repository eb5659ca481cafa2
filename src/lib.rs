//! cdirec - run controller for a single coherent-diffraction-imaging
//! phase-retrieval reconstruction
//!
//! Given a reconstruction config, a diffraction data file and an experiment
//! directory, cdirec selects the numeric backend, resolves how the solve is
//! seeded (random, continuation, or AI guess), drives the solver worker and
//! persists its results.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Reconstruct 3-D data on GPU 0 through the af family's cuda backend
//! cdirec run cuda /exp/scan_54/conf/config_rec /exp/scan_54/data/data.tif /exp/scan_54 --device 0
//!
//! # List the library names and the engines they resolve to
//! cdirec backends
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use cdirec::{CommandGuessGenerator, ProcessWorkerFactory, RunController, RunRequest};
//!
//! let controller = RunController::new(
//!     ProcessWorkerFactory::default(),
//!     CommandGuessGenerator::default(),
//! );
//! let request = RunRequest::new("af", "conf/config_rec", "data/data.npy", "/exp/scan_54");
//! match controller.run(&request) {
//!     Ok(report) => println!("saved to {}", report.save_dir.display()),
//!     Err(err) => eprintln!("{}", err.display_for_user()),
//! }
//! ```
//!
//! # Crates
//!
//! | Crate | Provides |
//! |-------|----------|
//! | `cdirec-config` | [`RunConfig`] |
//! | `cdirec-data` | [`DataSet`] |
//! | `cdirec-backend` | [`BackendRegistry`], [`BackendHandle`] |
//! | `cdirec-worker` | [`Worker`], [`drive_worker`], [`ProcessWorker`] |
//! | `cdirec-engine` | [`RunController`], [`resolve_plan`] |
//! | `cdirec-utils` | [`CdiError`], [`ExitCode`], logging, paths |

pub mod cli;
pub mod summary;

pub use cdirec_backend::{
    ArrayLib, BackendHandle, BackendKind, BackendRegistry, DeviceBinding, Dims, LibraryName,
    SubBackend,
};
pub use cdirec_config::{DeviceSpec, InitGuess, RunConfig, RunConfigBuilder};
pub use cdirec_data::{DataFormat, DataSet};
pub use cdirec_engine::{
    CommandGuessGenerator, Diffractometer, GuessGenerator, InitialGuessPlan, RunController,
    RunReport, RunRequest, resolve_plan,
};
pub use cdirec_utils::error::{
    BackendError, ConfigError, DataLoadError, GuessError, UserFriendlyError,
};
pub use cdirec_utils::types::{ErrorKind, WorkerState};
pub use cdirec_utils::{CdiError, ExitCode};
pub use cdirec_worker::{
    LifecycleOutcome, ProcessWorker, ProcessWorkerFactory, Worker, WorkerFactory, drive_worker,
};
pub use summary::RunSummary;

use std::path::Path;

/// Run one reconstruction with the external solver and AI guess programs
/// found on `PATH`.
///
/// `device` overrides the config's `device` key when given.
pub fn run_reconstruction(
    library: &str,
    config_path: &Path,
    data_path: &Path,
    parent_dir: &Path,
    device: Option<DeviceSpec>,
) -> Result<RunReport, CdiError> {
    let controller = RunController::new(
        ProcessWorkerFactory::default(),
        CommandGuessGenerator::default(),
    );
    let mut request = RunRequest::new(library, config_path, data_path, parent_dir);
    request.device = device;
    controller.run(&request)
}
