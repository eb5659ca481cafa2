//! Worker backed by an external solver program
//!
//! The solver is invoked once per reconstruction as
//!
//! ```text
//! <solver> <backend args> [--device N] --params <params.json> --data <file> --out <dir> [--init <seed_dir>]
//! ```
//!
//! and its exit code is the solve status.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cdirec_backend::{BackendHandle, DeviceBinding};
use cdirec_config::{DeviceSpec, RunConfig};
use cdirec_runner::{CommandSpec, NativeRunner, ProcessRunner};
use cdirec_utils::CdiError;
use cdirec_utils::atomic_write::{copy_tree_atomic, write_bytes_atomic};
use tempfile::TempDir;

use crate::worker::{Worker, WorkerFactory};

/// Solver program used when none is configured.
pub const DEFAULT_SOLVER: &str = "cohere-solver";

const PARAMS_FILE: &str = "params.json";
const OUTPUT_DIR: &str = "out";

fn stage_error(stage: &str, reason: impl ToString) -> CdiError {
    CdiError::Worker {
        stage: stage.to_string(),
        reason: reason.to_string(),
    }
}

/// Creates [`ProcessWorker`]s for one solver program.
#[derive(Debug, Clone)]
pub struct ProcessWorkerFactory<R = NativeRunner> {
    solver: PathBuf,
    runner: R,
}

impl ProcessWorkerFactory<NativeRunner> {
    #[must_use]
    pub fn new(solver: impl Into<PathBuf>) -> Self {
        Self::with_runner(solver, NativeRunner::new())
    }
}

impl Default for ProcessWorkerFactory<NativeRunner> {
    fn default() -> Self {
        Self::new(DEFAULT_SOLVER)
    }
}

impl<R> ProcessWorkerFactory<R> {
    #[must_use]
    pub fn with_runner(solver: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            solver: solver.into(),
            runner,
        }
    }
}

impl<R: ProcessRunner + Clone> WorkerFactory for ProcessWorkerFactory<R> {
    type Worker = ProcessWorker<R>;

    fn create(
        &self,
        config: &RunConfig,
        data_path: &Path,
        backend: &BackendHandle,
    ) -> Result<Self::Worker, CdiError> {
        let solver = which::which(&self.solver).map_err(|e| {
            stage_error(
                "create",
                format!("solver '{}' not found: {e}", self.solver.display()),
            )
        })?;
        tracing::debug!(solver = %solver.display(), backend = %backend, "worker created");

        Ok(ProcessWorker {
            solver,
            runner: self.runner.clone(),
            backend: backend.clone(),
            config: config.clone(),
            data_path: data_path.to_path_buf(),
            timeout: config.solver_timeout(),
            binding: None,
            scratch: None,
            seed_dir: None,
        })
    }
}

/// One reconstruction delegated to the solver program.
#[derive(Debug)]
pub struct ProcessWorker<R = NativeRunner> {
    solver: PathBuf,
    runner: R,
    backend: BackendHandle,
    config: RunConfig,
    data_path: PathBuf,
    /// Unbounded unless `solver_timeout_secs` is set
    timeout: Option<Duration>,
    binding: Option<DeviceBinding>,
    scratch: Option<TempDir>,
    seed_dir: Option<PathBuf>,
}

impl<R> ProcessWorker<R> {
    fn scratch(&self, stage: &str) -> Result<&Path, CdiError> {
        self.scratch
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| stage_error(stage, "worker is not initialized"))
    }

    fn command(&self, scratch: &Path) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.solver.as_os_str()).args(self.backend.solver_args());
        if let Some(binding) = &self.binding {
            cmd = cmd
                .args(binding.args.iter().cloned())
                .envs(binding.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        cmd = cmd
            .flag("--params", scratch.join(PARAMS_FILE))
            .flag("--data", &self.data_path)
            .flag("--out", scratch.join(OUTPUT_DIR));
        if let Some(seed) = &self.seed_dir {
            cmd = cmd.flag("--init", seed);
        }
        cmd
    }
}

impl<R: ProcessRunner> Worker for ProcessWorker<R> {
    fn acquire_device(&mut self, device: &DeviceSpec) -> i32 {
        match self.backend.bind_device(device.primary()) {
            Ok(binding) => {
                tracing::debug!(device = ?binding.device, backend = %self.backend, "device bound");
                self.binding = Some(binding);
                0
            }
            Err(err) => {
                tracing::warn!(error = %err, "device acquisition failed");
                -1
            }
        }
    }

    fn initialize(&mut self, seed_dir: Option<&Path>) -> Result<(), CdiError> {
        if let Some(seed) = seed_dir
            && !seed.is_dir()
        {
            return Err(stage_error(
                "initialize",
                format!("seed directory {} does not exist", seed.display()),
            ));
        }

        let scratch = tempfile::Builder::new().prefix("cdirec-").tempdir()?;
        let params = self
            .config
            .to_json()
            .map_err(|e| stage_error("initialize", e))?;
        write_bytes_atomic(&scratch.path().join(PARAMS_FILE), params.as_bytes())
            .map_err(|e| stage_error("initialize", format!("{e:#}")))?;

        self.seed_dir = seed_dir.map(Path::to_path_buf);
        self.scratch = Some(scratch);
        Ok(())
    }

    fn iterate(&mut self) -> Result<i32, CdiError> {
        let scratch = self.scratch("iterate")?;
        let cmd = self.command(scratch);
        tracing::info!(
            command = %cmd,
            timeout_secs = ?self.timeout.map(|t| t.as_secs()),
            "running solver"
        );

        let output = self.runner.run(&cmd, self.timeout)?;
        let status = output.status_code();
        if status != 0 {
            tracing::warn!(status, stderr = %output.stderr_tail(20), "solver exited with nonzero status");
        }
        Ok(status)
    }

    fn save(&mut self, save_dir: &Path) -> Result<(), CdiError> {
        let produced = self.scratch("save")?.join(OUTPUT_DIR);
        if !produced.is_dir() {
            return Err(stage_error("save", "solver produced no output directory"));
        }
        let copied = copy_tree_atomic(&produced, save_dir)
            .map_err(|e| stage_error("save", format!("{e:#}")))?;
        tracing::debug!(files = copied, save_dir = %save_dir.display(), "results copied");
        Ok(())
    }

    fn release(&mut self) {
        if let Some(scratch) = self.scratch.take()
            && let Err(err) = scratch.close()
        {
            tracing::warn!(error = %err, "failed to remove solver scratch directory");
        }
        self.binding = None;
        self.seed_dir = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdirec_backend::BackendRegistry;
    use cdirec_runner::{ProcessOutput, RunnerError};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Records the command and writes an artifact into `--out`.
    #[derive(Clone, Default)]
    struct FakeSolver {
        exit_code: i32,
        seen: Rc<RefCell<Vec<CommandSpec>>>,
        timeouts: Rc<RefCell<Vec<Option<Duration>>>>,
    }

    impl ProcessRunner for FakeSolver {
        fn run(
            &self,
            cmd: &CommandSpec,
            timeout: Option<Duration>,
        ) -> Result<ProcessOutput, RunnerError> {
            self.seen.borrow_mut().push(cmd.clone());
            self.timeouts.borrow_mut().push(timeout);
            let args: Vec<String> = cmd
                .args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            if let Some(pos) = args.iter().position(|a| a == "--out") {
                let out = PathBuf::from(&args[pos + 1]);
                fs::create_dir_all(&out).unwrap();
                fs::write(out.join("image.npy"), b"image").unwrap();
            }
            Ok(ProcessOutput::new(Vec::new(), b"diverged".to_vec(), Some(self.exit_code)))
        }
    }

    fn worker(library: &str, runner: FakeSolver, config: RunConfig) -> ProcessWorker<FakeSolver> {
        let backend = BackendRegistry::new().select(library, 2).unwrap();
        ProcessWorker {
            solver: PathBuf::from("/opt/solver"),
            runner,
            backend,
            timeout: config.solver_timeout(),
            config,
            data_path: PathBuf::from("/exp/data.npy"),
            binding: None,
            scratch: None,
            seed_dir: None,
        }
    }

    fn arg_strings(cmd: &CommandSpec) -> Vec<String> {
        cmd.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_full_run_saves_solver_output() {
        let temp = TempDir::new().unwrap();
        let runner = FakeSolver::default();
        let config = RunConfig::builder()
            .set("algorithm_sequence", "1* (20*ER)")
            .build()
            .unwrap();
        let mut worker = worker("cuda", runner.clone(), config);

        assert_eq!(worker.acquire_device(&DeviceSpec::from(1)), 0);
        worker.initialize(None).unwrap();
        let params = worker.scratch("test").unwrap().join(PARAMS_FILE);
        assert!(fs::read_to_string(&params).unwrap().contains("algorithm_sequence"));

        assert_eq!(worker.iterate().unwrap(), 0);
        let save_dir = temp.path().join("results_phasing");
        worker.save(&save_dir).unwrap();
        assert_eq!(fs::read(save_dir.join("image.npy")).unwrap(), b"image");

        let args = arg_strings(&runner.seen.borrow()[0]);
        assert_eq!(&args[..6], &["--lib", "af", "--dims", "2", "--af-backend", "cuda"]);
        assert!(args.windows(2).any(|w| w == ["--device", "1"]));
        assert!(args.windows(2).any(|w| w == ["--data", "/exp/data.npy"]));
        assert!(!args.contains(&"--init".to_string()));

        let scratch = worker.scratch("test").unwrap().to_path_buf();
        worker.release();
        assert!(!scratch.exists());
    }

    #[test]
    fn test_seed_dir_is_forwarded() {
        let temp = TempDir::new().unwrap();
        let runner = FakeSolver::default();
        let mut worker = worker("np", runner.clone(), RunConfig::builder().build().unwrap());

        worker.acquire_device(&DeviceSpec::default());
        worker.initialize(Some(temp.path())).unwrap();
        worker.iterate().unwrap();

        let args = arg_strings(&runner.seen.borrow()[0]);
        let seed = temp.path().to_string_lossy().into_owned();
        assert!(args.windows(2).any(|w| w[0] == "--init" && w[1] == seed));
    }

    #[test]
    fn test_missing_seed_dir_fails_initialize() {
        let mut worker = worker("np", FakeSolver::default(), RunConfig::builder().build().unwrap());
        let err = worker
            .initialize(Some(Path::new("/nonexistent/results_phasing")))
            .unwrap_err();
        assert!(matches!(err, CdiError::Worker { stage, .. } if stage == "initialize"));
    }

    #[test]
    fn test_nonzero_exit_is_status() {
        let runner = FakeSolver {
            exit_code: 3,
            ..Default::default()
        };
        let mut worker = worker("np", runner, RunConfig::builder().build().unwrap());
        worker.initialize(None).unwrap();
        assert_eq!(worker.iterate().unwrap(), 3);
    }

    #[test]
    fn test_solve_is_unbounded_unless_configured() {
        let runner = FakeSolver::default();
        let mut unbounded = worker("np", runner.clone(), RunConfig::builder().build().unwrap());
        unbounded.initialize(None).unwrap();
        unbounded.iterate().unwrap();

        let config = RunConfig::builder().solver_timeout_secs(90).build().unwrap();
        let mut bounded = worker("np", runner.clone(), config);
        bounded.initialize(None).unwrap();
        bounded.iterate().unwrap();

        assert_eq!(
            *runner.timeouts.borrow(),
            vec![None, Some(Duration::from_secs(90))]
        );
    }

    #[test]
    fn test_cp_binding_exports_environment() {
        let runner = FakeSolver::default();
        let mut worker = worker("cp", runner.clone(), RunConfig::builder().build().unwrap());
        assert_eq!(worker.acquire_device(&DeviceSpec::from(vec![2, 3])), 0);
        worker.initialize(None).unwrap();
        worker.iterate().unwrap();

        let cmd = &runner.seen.borrow()[0];
        assert_eq!(
            cmd.env.get(std::ffi::OsStr::new("CUDA_VISIBLE_DEVICES")),
            Some(&std::ffi::OsString::from("2"))
        );
    }

    #[test]
    fn test_invalid_device_is_negative_status() {
        let mut worker = worker("cp", FakeSolver::default(), RunConfig::builder().build().unwrap());
        assert!(worker.acquire_device(&DeviceSpec::from(-5)) < 0);
    }

    #[test]
    fn test_iterate_before_initialize_is_an_error() {
        let mut worker = worker("np", FakeSolver::default(), RunConfig::builder().build().unwrap());
        assert!(matches!(worker.iterate(), Err(CdiError::Worker { .. })));
    }

    #[test]
    fn test_release_without_acquisition_is_noop() {
        let mut worker = worker("np", FakeSolver::default(), RunConfig::builder().build().unwrap());
        worker.release();
        worker.release();
        assert!(worker.scratch.is_none());
    }

    #[test]
    fn test_factory_reports_missing_solver() {
        let factory = ProcessWorkerFactory::new("/nonexistent/cohere-solver");
        let backend = BackendRegistry::new().select("np", 2).unwrap();
        let err = factory
            .create(
                &RunConfig::builder().build().unwrap(),
                Path::new("data.npy"),
                &backend,
            )
            .unwrap_err();
        assert!(matches!(err, CdiError::Worker { stage, .. } if stage == "create"));
    }
}
