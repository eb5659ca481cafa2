//! AI guess generation
//!
//! A trained model turns the measured intensities into a seed for the
//! reconstruction. The model runs in an external program; this module
//! prepares its output directory and invokes it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cdirec_data::DataSet;
use cdirec_runner::{CommandSpec, NativeRunner, ProcessRunner};
use cdirec_utils::error::GuessError;

/// Generator program used when none is configured.
pub const DEFAULT_AI_GUESS_CMD: &str = "cohere-ai-guess";

/// Produces seed artifacts in `out_dir` from data and a trained model.
pub trait GuessGenerator {
    fn run_guess(&self, data: &DataSet, model: &Path, out_dir: &Path) -> Result<(), GuessError>;
}

impl<G: GuessGenerator + ?Sized> GuessGenerator for &G {
    fn run_guess(&self, data: &DataSet, model: &Path, out_dir: &Path) -> Result<(), GuessError> {
        (**self).run_guess(data, model, out_dir)
    }
}

/// Empty `dir` of files (non-recursive), or create it.
///
/// Subdirectories are left in place.
pub fn prepare_ai_dir(dir: &Path) -> Result<(), GuessError> {
    let prepare_failed = |e: std::io::Error| GuessError::PrepareFailed {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    };

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(prepare_failed)?;
        return Ok(());
    }

    let mut removed = 0usize;
    for entry in fs::read_dir(dir).map_err(prepare_failed)? {
        let entry = entry.map_err(prepare_failed)?;
        if !entry.file_type().map_err(prepare_failed)?.is_dir() {
            fs::remove_file(entry.path()).map_err(prepare_failed)?;
            removed += 1;
        }
    }
    tracing::debug!(dir = %dir.display(), removed, "cleared AI guess directory");
    Ok(())
}

/// Runs an external generator as
/// `<program> --data <npy> --model <model> --out <out_dir>`.
#[derive(Debug, Clone)]
pub struct CommandGuessGenerator<R = NativeRunner> {
    program: PathBuf,
    runner: R,
    /// Unbounded unless set with [`CommandGuessGenerator::timeout`]
    timeout: Option<Duration>,
}

impl CommandGuessGenerator<NativeRunner> {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, NativeRunner::new())
    }
}

impl Default for CommandGuessGenerator<NativeRunner> {
    fn default() -> Self {
        Self::new(DEFAULT_AI_GUESS_CMD)
    }
}

impl<R> CommandGuessGenerator<R> {
    #[must_use]
    pub fn with_runner(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
            timeout: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<R: ProcessRunner> GuessGenerator for CommandGuessGenerator<R> {
    fn run_guess(&self, data: &DataSet, model: &Path, out_dir: &Path) -> Result<(), GuessError> {
        let program_name = self.program.display().to_string();
        let program = which::which(&self.program).map_err(|e| GuessError::GeneratorNotFound {
            program: program_name.clone(),
            reason: e.to_string(),
        })?;

        let staging = tempfile::Builder::new()
            .prefix("cdirec-ai-")
            .tempdir()
            .map_err(|e| GuessError::PrepareFailed {
                dir: std::env::temp_dir(),
                reason: e.to_string(),
            })?;
        let data_file = staging.path().join("data.npy");
        data.write_npy(&data_file)
            .map_err(|e| GuessError::PrepareFailed {
                dir: staging.path().to_path_buf(),
                reason: format!("{e:#}"),
            })?;

        let cmd = CommandSpec::new(program.as_os_str())
            .flag("--data", &data_file)
            .flag("--model", model)
            .flag("--out", out_dir);

        tracing::info!(program = %program.display(), model = %model.display(), "running AI guess");
        let output = self.runner.run(&cmd, self.timeout)?;
        if !output.success() {
            return Err(GuessError::GeneratorFailed {
                program: program_name,
                status: output.status_code(),
                stderr_tail: output.stderr_tail(20),
            });
        }
        Ok(())
    }
}
