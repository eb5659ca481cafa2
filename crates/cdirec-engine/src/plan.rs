use std::fmt;
use std::path::{Path, PathBuf};

use cdirec_config::{InitGuess, RunConfig};
use cdirec_data::DataSet;
use cdirec_utils::CdiError;
use cdirec_utils::error::ConfigError;
use cdirec_utils::paths::ai_guess_dir;

use crate::guess::{GuessGenerator, prepare_ai_dir};

/// Resolved seeding of the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialGuessPlan {
    Random,
    /// Resume from a previous run's results
    Continue(PathBuf),
    /// Seed from AI guess artifacts
    AiGuess(PathBuf),
}

impl InitialGuessPlan {
    /// Directory handed to the worker's initialize step.
    #[must_use]
    pub fn seed_dir(&self) -> Option<&Path> {
        match self {
            Self::Random => None,
            Self::Continue(dir) | Self::AiGuess(dir) => Some(dir),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> InitGuess {
        match self {
            Self::Random => InitGuess::Random,
            Self::Continue(_) => InitGuess::Continue,
            Self::AiGuess(_) => InitGuess::AiGuess,
        }
    }
}

impl fmt::Display for InitialGuessPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seed_dir() {
            None => write!(f, "{}", self.strategy()),
            Some(dir) => write!(f, "{} from {}", self.strategy(), dir.display()),
        }
    }
}

/// Decide how the worker is seeded.
///
/// `continue` takes `continue_dir` as-is; its existence is the worker's
/// concern. `AI_guess` checks the model file before touching `results_AI`,
/// then clears or creates that directory and runs the generator.
pub fn resolve_plan<G: GuessGenerator + ?Sized>(
    config: &RunConfig,
    parent_dir: &Path,
    data: &DataSet,
    generator: &G,
) -> Result<InitialGuessPlan, CdiError> {
    let plan = match config.init_guess()? {
        InitGuess::Random => InitialGuessPlan::Random,
        InitGuess::Continue => {
            let dir = config
                .continue_dir()
                .ok_or(ConfigError::MissingContinueDir)?;
            InitialGuessPlan::Continue(dir)
        }
        InitGuess::AiGuess => {
            let model = config
                .ai_trained_model()
                .ok_or(ConfigError::MissingModelKey)?;
            if !model.is_file() {
                return Err(ConfigError::MissingModelFile { path: model }.into());
            }

            let out_dir = ai_guess_dir(parent_dir);
            prepare_ai_dir(&out_dir)?;
            generator.run_guess(data, &model, &out_dir)?;
            InitialGuessPlan::AiGuess(out_dir)
        }
    };

    tracing::info!(plan = %plan, "initial guess resolved");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdirec_utils::error::GuessError;
    use ndarray::{ArrayD, IxDyn};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
        fail: bool,
    }

    impl GuessGenerator for RecordingGenerator {
        fn run_guess(&self, _data: &DataSet, model: &Path, out_dir: &Path) -> Result<(), GuessError> {
            self.calls
                .borrow_mut()
                .push((model.to_path_buf(), out_dir.to_path_buf()));
            if self.fail {
                return Err(GuessError::GeneratorFailed {
                    program: "fake".to_string(),
                    status: 2,
                    stderr_tail: String::new(),
                });
            }
            fs::write(out_dir.join("image.npy"), b"seed").unwrap();
            Ok(())
        }
    }

    fn data() -> DataSet {
        DataSet::from_array(ArrayD::zeros(IxDyn(&[4, 4])), "data.npy")
    }

    #[test]
    fn test_default_is_random() {
        let temp = TempDir::new().unwrap();
        let generator = RecordingGenerator::default();
        let config = RunConfig::builder().build().unwrap();
        let plan = resolve_plan(&config, temp.path(), &data(), &generator).unwrap();
        assert_eq!(plan, InitialGuessPlan::Random);
        assert!(plan.seed_dir().is_none());
        assert!(generator.calls.borrow().is_empty());
    }

    #[test]
    fn test_continue_passes_dir_unchanged() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::builder()
            .init_guess("continue")
            .continue_dir("/does/not/exist")
            .build()
            .unwrap();
        let plan = resolve_plan(&config, temp.path(), &data(), &RecordingGenerator::default())
            .unwrap();
        assert_eq!(plan, InitialGuessPlan::Continue(PathBuf::from("/does/not/exist")));
    }

    #[test]
    fn test_continue_without_dir() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::builder().init_guess("continue").build().unwrap();
        let err = resolve_plan(&config, temp.path(), &data(), &RecordingGenerator::default())
            .unwrap_err();
        assert!(matches!(err, CdiError::Config(ConfigError::MissingContinueDir)));
    }

    #[test]
    fn test_unknown_strategy() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::builder().init_guess("best").build().unwrap();
        let err = resolve_plan(&config, temp.path(), &data(), &RecordingGenerator::default())
            .unwrap_err();
        assert!(matches!(err, CdiError::Config(ConfigError::UnknownInitGuess { .. })));
    }

    #[test]
    fn test_ai_guess_runs_generator_into_results_ai() {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("trained_model.hdf5");
        fs::write(&model, b"weights").unwrap();
        let ai_dir = temp.path().join("results_AI");
        fs::create_dir_all(&ai_dir).unwrap();
        fs::write(ai_dir.join("stale.npy"), b"old").unwrap();

        let generator = RecordingGenerator::default();
        let config = RunConfig::builder()
            .init_guess("AI_guess")
            .ai_trained_model(&model)
            .build()
            .unwrap();
        let plan = resolve_plan(&config, temp.path(), &data(), &generator).unwrap();

        assert_eq!(plan, InitialGuessPlan::AiGuess(ai_dir.clone()));
        assert_eq!(generator.calls.borrow().as_slice(), &[(model, ai_dir.clone())]);
        assert!(!ai_dir.join("stale.npy").exists());
        assert!(ai_dir.join("image.npy").exists());
    }

    #[test]
    fn test_ai_guess_missing_model_leaves_results_ai_alone() {
        let temp = TempDir::new().unwrap();
        let generator = RecordingGenerator::default();
        let config = RunConfig::builder()
            .init_guess("AI_guess")
            .ai_trained_model(temp.path().join("missing.hdf5"))
            .build()
            .unwrap();

        let err = resolve_plan(&config, temp.path(), &data(), &generator).unwrap_err();
        assert!(matches!(err, CdiError::Config(ConfigError::MissingModelFile { .. })));
        assert!(!temp.path().join("results_AI").exists());
        assert!(generator.calls.borrow().is_empty());
    }

    #[test]
    fn test_ai_guess_without_model_key() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::builder().init_guess("AI_guess").build().unwrap();
        let err = resolve_plan(&config, temp.path(), &data(), &RecordingGenerator::default())
            .unwrap_err();
        assert!(matches!(err, CdiError::Config(ConfigError::MissingModelKey)));
    }

    #[test]
    fn test_generator_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("model.hdf5");
        fs::write(&model, b"weights").unwrap();
        let generator = RecordingGenerator {
            fail: true,
            ..Default::default()
        };
        let config = RunConfig::builder()
            .init_guess("AI_guess")
            .ai_trained_model(&model)
            .build()
            .unwrap();
        let err = resolve_plan(&config, temp.path(), &data(), &generator).unwrap_err();
        assert!(matches!(err, CdiError::Guess(GuessError::GeneratorFailed { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(InitialGuessPlan::Random.to_string(), "random");
        assert_eq!(
            InitialGuessPlan::Continue(PathBuf::from("/r")).to_string(),
            "continue from /r"
        );
    }
}
