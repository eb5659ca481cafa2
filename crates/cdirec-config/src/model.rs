use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};

use cdirec_utils::error::ConfigError;

/// Config keys with meaning to the run controller.
pub mod keys {
    pub const INIT_GUESS: &str = "init_guess";
    pub const CONTINUE_DIR: &str = "continue_dir";
    pub const AI_TRAINED_MODEL: &str = "AI_trained_model";
    pub const DEVICE: &str = "device";
    pub const SAVE_DIR: &str = "save_dir";
    pub const DIFFRACTOMETER: &str = "diffractometer";
    pub const SOLVER_TIMEOUT_SECS: &str = "solver_timeout_secs";
}

/// How the reconstruction is seeded before iterating.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
pub enum InitGuess {
    /// Blank/random start (default)
    #[default]
    #[strum(serialize = "random")]
    #[serde(rename = "random")]
    Random,
    /// Resume from a previous run's saved arrays
    #[strum(serialize = "continue")]
    #[serde(rename = "continue")]
    Continue,
    /// Seed from a trained model's output
    #[strum(serialize = "AI_guess")]
    #[serde(rename = "AI_guess")]
    AiGuess,
}

/// Compute device request: one or more device ids, `-1` meaning
/// "let the backend decide".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSpec(Vec<i32>);

impl DeviceSpec {
    /// Id used by a single reconstruction: the first entry, or `-1`.
    #[must_use]
    pub fn primary(&self) -> i32 {
        self.0.first().copied().unwrap_or(-1)
    }

    #[must_use]
    pub fn ids(&self) -> &[i32] {
        &self.0
    }

    #[must_use]
    pub fn backend_decides(&self) -> bool {
        self.primary() == -1
    }
}

impl Default for DeviceSpec {
    fn default() -> Self {
        Self(vec![-1])
    }
}

impl From<i32> for DeviceSpec {
    fn from(id: i32) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<i32>> for DeviceSpec {
    fn from(ids: Vec<i32>) -> Self {
        if ids.is_empty() {
            Self::default()
        } else {
            Self(ids)
        }
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

/// Immutable reconstruction configuration.
///
/// Built once by [`RunConfig::load`] or [`RunConfig::builder`] and never
/// mutated afterwards. Unrecognized keys are preserved for the solver
/// (see [`RunConfig::to_json`]).
///
/// # Example
///
/// ```rust
/// use cdirec_config::{InitGuess, RunConfig};
///
/// let config = RunConfig::builder()
///     .init_guess("continue")
///     .continue_dir("/exp/results_phasing")
///     .device(vec![1, 2])
///     .build()?;
///
/// assert_eq!(config.init_guess()?, InitGuess::Continue);
/// assert_eq!(config.device().primary(), 1);
/// # Ok::<(), cdirec_utils::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub(crate) values: toml::Table,
    pub(crate) source: Option<PathBuf>,
}

impl RunConfig {
    /// Raw value for any key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(toml::Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// File this config was read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Initialization strategy; `random` when `init_guess` is absent.
    pub fn init_guess(&self) -> Result<InitGuess, ConfigError> {
        match self.get_str(keys::INIT_GUESS) {
            None => Ok(InitGuess::Random),
            Some(value) => {
                InitGuess::from_str(value).map_err(|_| ConfigError::UnknownInitGuess {
                    value: value.to_string(),
                })
            }
        }
    }

    #[must_use]
    pub fn continue_dir(&self) -> Option<PathBuf> {
        self.get_str(keys::CONTINUE_DIR).map(PathBuf::from)
    }

    #[must_use]
    pub fn ai_trained_model(&self) -> Option<PathBuf> {
        self.get_str(keys::AI_TRAINED_MODEL).map(PathBuf::from)
    }

    #[must_use]
    pub fn save_dir(&self) -> Option<PathBuf> {
        self.get_str(keys::SAVE_DIR).map(PathBuf::from)
    }

    #[must_use]
    pub fn diffractometer(&self) -> Option<&str> {
        self.get_str(keys::DIFFRACTOMETER)
    }

    /// Device request; `[-1]` when `device` is absent.
    #[must_use]
    pub fn device(&self) -> DeviceSpec {
        match self.values.get(keys::DEVICE) {
            Some(toml::Value::Integer(id)) => DeviceSpec::from(*id as i32),
            Some(toml::Value::Array(ids)) => DeviceSpec::from(
                ids.iter()
                    .filter_map(toml::Value::as_integer)
                    .map(|id| id as i32)
                    .collect::<Vec<_>>(),
            ),
            _ => DeviceSpec::default(),
        }
    }

    /// Upper bound on a single solver invocation, if configured.
    #[must_use]
    pub fn solver_timeout(&self) -> Option<Duration> {
        self.values
            .get(keys::SOLVER_TIMEOUT_SECS)
            .and_then(toml::Value::as_integer)
            .map(|secs| Duration::from_secs(secs as u64))
    }

    /// Full mapping as JSON, for handing parameters to the solver.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml_src: &str) -> RunConfig {
        RunConfig {
            values: toml::from_str(toml_src).unwrap(),
            source: None,
        }
    }

    #[test]
    fn test_init_guess_defaults_to_random() {
        assert_eq!(config("").init_guess().unwrap(), InitGuess::Random);
    }

    #[test]
    fn test_init_guess_parses_all_strategies() {
        assert_eq!(
            config("init_guess = 'random'").init_guess().unwrap(),
            InitGuess::Random
        );
        assert_eq!(
            config("init_guess = 'continue'").init_guess().unwrap(),
            InitGuess::Continue
        );
        assert_eq!(
            config("init_guess = 'AI_guess'").init_guess().unwrap(),
            InitGuess::AiGuess
        );
    }

    #[test]
    fn test_unknown_init_guess_is_rejected() {
        let err = config("init_guess = 'ai_guess'").init_guess().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInitGuess { value } if value == "ai_guess"));
    }

    #[test]
    fn test_device_forms() {
        assert_eq!(config("").device(), DeviceSpec::from(-1));
        assert_eq!(config("device = 2").device().ids(), &[2]);
        assert_eq!(config("device = [0, 3]").device().primary(), 0);
        assert!(config("device = []").device().backend_decides());
    }

    #[test]
    fn test_device_spec_display() {
        assert_eq!(DeviceSpec::from(vec![0, 1]).to_string(), "[0, 1]");
        assert_eq!(DeviceSpec::default().to_string(), "[-1]");
    }

    #[test]
    fn test_unrecognized_keys_reach_json() {
        let cfg = config("algorithm_sequence = '3* (20*ER + 180*HIO) + 20*ER'\nshrink_wrap_trigger = [1, 1]");
        let json: serde_json::Value = serde_json::from_str(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(
            json["algorithm_sequence"],
            serde_json::json!("3* (20*ER + 180*HIO) + 20*ER")
        );
        assert_eq!(json["shrink_wrap_trigger"], serde_json::json!([1, 1]));
    }

    #[test]
    fn test_init_guess_round_trips_through_display() {
        for guess in [InitGuess::Random, InitGuess::Continue, InitGuess::AiGuess] {
            assert_eq!(InitGuess::from_str(&guess.to_string()).unwrap(), guess);
        }
    }
}
