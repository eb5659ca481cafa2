use std::path::PathBuf;

use cdirec_utils::error::ConfigError;

use crate::model::{RunConfig, keys};

impl RunConfig {
    /// Create a builder for programmatic configuration.
    #[must_use]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }
}

/// Builder for [`RunConfig`].
///
/// Values set here are validated exactly like values read from a file.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    values: toml::Table,
    source: Option<PathBuf>,
}

impl RunConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary key, e.g. solver parameters the controller passes through.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn init_guess(self, strategy: impl Into<String>) -> Self {
        self.set(keys::INIT_GUESS, toml::Value::String(strategy.into()))
    }

    #[must_use]
    pub fn continue_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.set_path(keys::CONTINUE_DIR, dir.into())
    }

    #[must_use]
    pub fn ai_trained_model(self, model: impl Into<PathBuf>) -> Self {
        self.set_path(keys::AI_TRAINED_MODEL, model.into())
    }

    #[must_use]
    pub fn save_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.set_path(keys::SAVE_DIR, dir.into())
    }

    #[must_use]
    pub fn device(self, ids: Vec<i32>) -> Self {
        let ids = ids
            .into_iter()
            .map(|id| toml::Value::Integer(i64::from(id)))
            .collect();
        self.set(keys::DEVICE, toml::Value::Array(ids))
    }

    #[must_use]
    pub fn diffractometer(self, name: impl Into<String>) -> Self {
        self.set(keys::DIFFRACTOMETER, toml::Value::String(name.into()))
    }

    #[must_use]
    pub fn solver_timeout_secs(self, secs: i64) -> Self {
        self.set(keys::SOLVER_TIMEOUT_SECS, toml::Value::Integer(secs))
    }

    /// Record where these values came from.
    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let config = RunConfig {
            values: self.values,
            source: self.source,
        };
        config.validate()?;
        Ok(config)
    }

    fn set_path(self, key: &str, path: PathBuf) -> Self {
        self.set(
            key,
            toml::Value::String(path.to_string_lossy().into_owned()),
        )
    }
}
