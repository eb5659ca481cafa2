use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use cdirec_runner::RunnerError;

use crate::exit_codes::ExitCode;
use crate::types::ErrorKind;

/// Library-level error type for a reconstruction run.
///
/// Every abort condition of a run surfaces as one of these variants. The CLI
/// renders them with [`display_for_user()`](Self::display_for_user) and maps
/// them to a process exit status with [`to_exit_code()`](Self::to_exit_code).
///
/// | Category | Variant(s) |
/// |----------|------------|
/// | Configuration | `Config` |
/// | Data input | `DataLoad` |
/// | Backend selection | `Backend` |
/// | Device | `DeviceAcquisition` |
/// | Solver | `SolveFailed`, `Worker`, `Runner` |
/// | AI guess | `Guess` |
/// | File system | `Io` |
///
/// Library code returns `CdiError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum CdiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("AI guess error: {0}")]
    Guess(#[from] GuessError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device acquisition failed for device {device} (status {status})")]
    DeviceAcquisition { device: i32, status: i32 },

    #[error("Solver finished with nonzero status {status}; results were not saved")]
    SolveFailed { status: i32 },

    #[error("Worker {stage} failed: {reason}")]
    Worker { stage: String, reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for grouping in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataInput,
    Backend,
    Device,
    Solver,
    AiGuess,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::DataInput => write!(f, "Data Input"),
            Self::Backend => write!(f, "Backend"),
            Self::Device => write!(f, "Device"),
            Self::Solver => write!(f, "Solver"),
            Self::AiGuess => write!(f, "AI Guess"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown init_guess strategy '{value}'")]
    UnknownInitGuess { value: String },

    #[error("init_guess is AI_guess but AI_trained_model is not set")]
    MissingModelKey,

    #[error("AI trained model file does not exist: {path}")]
    MissingModelFile { path: PathBuf },

    #[error("init_guess is continue but continue_dir is not set")]
    MissingContinueDir,
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => {
                format!("Configuration file not found: {}", path.display())
            }
            Self::InvalidFile { path, reason } => {
                format!(
                    "Configuration file {} could not be parsed: {reason}",
                    path.display()
                )
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::UnknownInitGuess { value } => {
                format!("init_guess '{value}' is not a known initialization strategy")
            }
            Self::MissingModelKey => {
                "AI_guess initialization requested but no AI_trained_model configured".to_string()
            }
            Self::MissingModelFile { path } => {
                format!("There is no trained model file at {}", path.display())
            }
            Self::MissingContinueDir => {
                "Continuation requested but no continue_dir configured".to_string()
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } | Self::InvalidFile { .. } => Some(
                "Reconstruction config files are TOML documents of `key = value` pairs."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' option has specific type requirements."
            )),
            Self::UnknownInitGuess { .. } => Some(
                "init_guess selects how the reconstruction is seeded before iterating.".to_string(),
            ),
            Self::MissingModelKey | Self::MissingModelFile { .. } => Some(
                "AI_guess seeds the reconstruction with the output of a trained model.".to_string(),
            ),
            Self::MissingContinueDir => Some(
                "Continuation resumes from arrays saved by a previous reconstruction.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Check the config path passed on the command line".to_string(),
                "Config files are usually named config_rec or config_rec_<suffix>".to_string(),
            ],
            Self::InvalidFile { .. } => vec![
                "Check the TOML syntax of the config file".to_string(),
                "Quote string values, e.g. init_guess = \"random\"".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "device" => vec![
                    "Use an integer or a list of integers, e.g. device = [0, 1]".to_string(),
                    "Use -1 to let the backend pick a device".to_string(),
                ],
                _ => vec![
                    "Use a quoted string value for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::UnknownInitGuess { .. } => vec![
                "Use one of: \"random\", \"continue\", \"AI_guess\"".to_string(),
                "Remove init_guess to start from a random guess".to_string(),
            ],
            Self::MissingModelKey => vec![
                "Add AI_trained_model = \"/path/to/model\" to the config".to_string(),
                "Or switch init_guess to \"random\"".to_string(),
            ],
            Self::MissingModelFile { .. } => vec![
                "Check the AI_trained_model path in the config".to_string(),
                "Make sure the model file is readable from this machine".to_string(),
            ],
            Self::MissingContinueDir => vec![
                "Add continue_dir = \"/path/to/previous/results\" to the config".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Data file errors
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Unsupported data file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Could not load data file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

impl UserFriendlyError for DataLoadError {
    fn user_message(&self) -> String {
        match self {
            Self::UnsupportedFormat { path } => {
                format!("No loadable data file: {}", path.display())
            }
            Self::ReadFailed { path, reason } => {
                format!("Could not load data file {}: {reason}", path.display())
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some("Diffraction data is read from .tif, .tiff or .npy files.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnsupportedFormat { .. } => vec![
                "Convert the data to a .npy or .tif file".to_string(),
                "Check that the data path points at the prepared data file".to_string(),
            ],
            Self::ReadFailed { .. } => vec![
                "Check that the file is complete and readable".to_string(),
                "Check that the array holds numeric intensity values".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::DataInput
    }
}

/// Backend selection and device binding errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unknown backend library '{name}'")]
    UnknownBackend { name: String },

    #[error("Backend '{library}' does not support {ndim}-dimensional data")]
    UnsupportedDimensionality { library: String, ndim: usize },

    #[error("Backend '{backend}' rejected device {device}: {reason}")]
    DeviceRejected {
        backend: String,
        device: i32,
        reason: String,
    },
}

impl UserFriendlyError for BackendError {
    fn user_message(&self) -> String {
        match self {
            Self::UnknownBackend { name } => {
                format!("'{name}' is not a known processing library")
            }
            Self::UnsupportedDimensionality { library, ndim } => {
                format!("The {library} library cannot reconstruct {ndim}-dimensional data")
            }
            Self::DeviceRejected {
                backend,
                device,
                reason,
            } => {
                format!("Device {device} cannot be used with {backend}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UnknownBackend { .. } | Self::UnsupportedDimensionality { .. } => Some(
                "The library selects the numeric engine; af variants exist for 1-, 2- and 3-D data."
                    .to_string(),
            ),
            Self::DeviceRejected { .. } => {
                Some("Device ids are GPU indices, or -1 to let the backend decide.".to_string())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownBackend { .. } => vec![
                "Use one of: af, cpu, opencl, cuda, cp, np".to_string(),
                "Run `cdirec backends` to list the available libraries".to_string(),
            ],
            Self::UnsupportedDimensionality { .. } => vec![
                "Use the cp or np library for data of this rank".to_string(),
            ],
            Self::DeviceRejected { .. } => vec![
                "Pass --device -1 to let the backend choose".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::DeviceRejected { .. } => ErrorCategory::Device,
            _ => ErrorCategory::Backend,
        }
    }
}

/// Errors from the external AI guess generator
#[derive(Error, Debug)]
pub enum GuessError {
    #[error("AI guess generator '{program}' not found: {reason}")]
    GeneratorNotFound { program: String, reason: String },

    #[error("AI guess generator '{program}' exited with status {status}: {stderr_tail}")]
    GeneratorFailed {
        program: String,
        status: i32,
        stderr_tail: String,
    },

    #[error("Failed to prepare AI guess directory {dir}: {reason}")]
    PrepareFailed { dir: PathBuf, reason: String },

    #[error("AI guess generator could not run: {0}")]
    Runner(#[from] RunnerError),
}

impl UserFriendlyError for GuessError {
    fn user_message(&self) -> String {
        match self {
            Self::GeneratorNotFound { program, .. } => {
                format!("The AI guess program '{program}' is not installed or not on PATH")
            }
            Self::GeneratorFailed {
                program, status, ..
            } => {
                format!("The AI guess program '{program}' failed with status {status}")
            }
            Self::PrepareFailed { dir, reason } => {
                format!("Could not prepare {}: {reason}", dir.display())
            }
            Self::Runner(err) => err.user_message(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::GeneratorFailed { stderr_tail, .. } if !stderr_tail.is_empty() => {
                Some(format!("Generator stderr:\n{stderr_tail}"))
            }
            _ => Some(
                "No reconstruction is attempted without a seed when AI_guess is requested."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::GeneratorNotFound { .. } => vec![
                "Install the AI guess program or pass --ai-guess-cmd".to_string(),
                "Switch init_guess to \"random\" to skip the AI step".to_string(),
            ],
            Self::PrepareFailed { .. } => vec![
                "Check write permissions on the experiment directory".to_string(),
            ],
            _ => vec!["Check that the trained model matches the data dimensions".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::AiGuess
    }
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        match self {
            RunnerError::SpawnFailed { program, reason } => {
                format!("Could not start '{program}': {reason}")
            }
            RunnerError::WaitFailed { program, reason } => {
                format!("Lost track of '{program}': {reason}")
            }
            RunnerError::Timeout {
                program,
                timeout_seconds,
            } => {
                format!("'{program}' did not finish within {timeout_seconds} seconds")
            }
        }
    }

    fn context(&self) -> Option<String> {
        None
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            RunnerError::Timeout { .. } => {
                vec!["Raise or remove solver_timeout_secs in the config".to_string()]
            }
            _ => vec!["Check that the program is installed and executable".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Solver
    }
}

impl UserFriendlyError for CdiError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::DataLoad(err) => err.user_message(),
            Self::Backend(err) => err.user_message(),
            Self::Guess(err) => err.user_message(),
            Self::Runner(err) => err.user_message(),
            Self::Io(err) => format!("File system operation failed: {err}"),
            Self::DeviceAcquisition { device, status } => {
                format!("Could not acquire compute device {device} (status {status})")
            }
            Self::SolveFailed { status } => {
                format!("The reconstruction did not converge (status {status}); nothing was saved")
            }
            Self::Worker { stage, reason } => {
                format!("The solver worker failed during {stage}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::DataLoad(err) => err.context(),
            Self::Backend(err) => err.context(),
            Self::Guess(err) => err.context(),
            Self::Runner(err) => err.context(),
            Self::Io(_) => None,
            Self::DeviceAcquisition { .. } => Some(
                "The run stops before initialization when no device can be bound.".to_string(),
            ),
            Self::SolveFailed { .. } => {
                Some("Device and solver resources were released.".to_string())
            }
            Self::Worker { .. } => {
                Some("Device and solver resources were released.".to_string())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::DataLoad(err) => err.suggestions(),
            Self::Backend(err) => err.suggestions(),
            Self::Guess(err) => err.suggestions(),
            Self::Runner(err) => err.suggestions(),
            Self::Io(_) => vec!["Check file permissions and free disk space".to_string()],
            Self::DeviceAcquisition { .. } => vec![
                "Check that the requested GPU exists and is not exhausted".to_string(),
                "Pass --device -1 to let the backend choose".to_string(),
            ],
            Self::SolveFailed { .. } => vec![
                "Inspect the solver log and adjust the algorithm parameters".to_string(),
            ],
            Self::Worker { stage, .. } if stage == "initialize" => vec![
                "Check that continue_dir points at a previous results directory".to_string(),
            ],
            Self::Worker { .. } => vec!["Check the solver installation".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::DataLoad(err) => err.category(),
            Self::Backend(err) => err.category(),
            Self::Guess(err) => err.category(),
            Self::Runner(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::DeviceAcquisition { .. } => ErrorCategory::Device,
            Self::SolveFailed { .. } | Self::Worker { .. } => ErrorCategory::Solver,
        }
    }
}

impl CdiError {
    /// Multi-line report with the message, context and suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    ///
    /// | Exit Code | Name | Errors |
    /// |-----------|------|--------|
    /// | 1 | INTERNAL | `Io` |
    /// | 2 | CONFIG | `Config` |
    /// | 3 | DATA_LOAD | `DataLoad` |
    /// | 4 | BACKEND | `Backend` (except device rejection) |
    /// | 5 | DEVICE | `DeviceAcquisition`, `Backend::DeviceRejected` |
    /// | 6 | SOLVE_FAILED | `SolveFailed`, `Worker`, `Runner` |
    /// | 7 | AI_GUESS | `Guess` |
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CONFIG,
            Self::DataLoad(_) => ExitCode::DATA_LOAD,
            Self::Backend(BackendError::DeviceRejected { .. }) => ExitCode::DEVICE,
            Self::Backend(_) => ExitCode::BACKEND,
            Self::DeviceAcquisition { .. } => ExitCode::DEVICE,
            Self::SolveFailed { .. } | Self::Worker { .. } | Self::Runner(_) => {
                ExitCode::SOLVE_FAILED
            }
            Self::Guess(_) => ExitCode::AI_GUESS,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }

    /// Serializable error kind for machine-readable reports.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::DataLoad(_) => ErrorKind::DataLoad,
            Self::Backend(BackendError::DeviceRejected { .. }) | Self::DeviceAcquisition { .. } => {
                ErrorKind::DeviceAcquisition
            }
            Self::Backend(_) => ErrorKind::Backend,
            Self::SolveFailed { .. } => ErrorKind::SolveFailure,
            Self::Worker { .. } | Self::Runner(_) => ErrorKind::Worker,
            Self::Guess(_) => ErrorKind::AiGuess,
            Self::Io(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_per_category() {
        let cases: Vec<(CdiError, ExitCode)> = vec![
            (ConfigError::MissingModelKey.into(), ExitCode::CONFIG),
            (
                DataLoadError::UnsupportedFormat {
                    path: "scan.h5".into(),
                }
                .into(),
                ExitCode::DATA_LOAD,
            ),
            (
                BackendError::UnknownBackend {
                    name: "torch".to_string(),
                }
                .into(),
                ExitCode::BACKEND,
            ),
            (
                BackendError::DeviceRejected {
                    backend: "cp".to_string(),
                    device: -4,
                    reason: "negative".to_string(),
                }
                .into(),
                ExitCode::DEVICE,
            ),
            (
                CdiError::DeviceAcquisition {
                    device: 3,
                    status: -1,
                },
                ExitCode::DEVICE,
            ),
            (CdiError::SolveFailed { status: 1 }, ExitCode::SOLVE_FAILED),
            (
                GuessError::GeneratorNotFound {
                    program: "cohere-ai-guess".to_string(),
                    reason: "not on PATH".to_string(),
                }
                .into(),
                ExitCode::AI_GUESS,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.to_exit_code(), code, "{err}");
        }
    }

    #[test]
    fn test_display_for_user_has_sections() {
        let err = CdiError::from(ConfigError::UnknownInitGuess {
            value: "magic".to_string(),
        });
        let report = err.display_for_user();
        assert!(report.starts_with("Error: init_guess 'magic'"));
        assert!(report.contains("Context:"));
        assert!(report.contains("Suggestions:"));
        assert!(report.contains("\"AI_guess\""));
    }

    #[test]
    fn test_device_rejection_is_device_category() {
        let err = BackendError::DeviceRejected {
            backend: "cp".to_string(),
            device: -2,
            reason: "no such device".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Device);
        assert_eq!(CdiError::from(err).kind(), ErrorKind::DeviceAcquisition);
    }

    #[test]
    fn test_generator_stderr_shows_in_context() {
        let err = GuessError::GeneratorFailed {
            program: "cohere-ai-guess".to_string(),
            status: 2,
            stderr_tail: "model shape mismatch".to_string(),
        };
        assert!(err.context().unwrap().contains("model shape mismatch"));
    }
}
