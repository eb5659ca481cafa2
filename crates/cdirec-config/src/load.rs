use std::fs;
use std::io;
use std::path::Path;

use cdirec_utils::error::ConfigError;

use crate::model::RunConfig;

impl RunConfig {
    /// Read and validate a reconstruction config file.
    ///
    /// The file is a TOML document of top-level `key = value` pairs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::InvalidFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        Self::parse(&content, Some(path))
    }

    /// Parse config text; `origin` is recorded as the config source.
    pub fn parse(content: &str, origin: Option<&Path>) -> Result<Self, ConfigError> {
        let values: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFile {
                path: origin.map(Path::to_path_buf).unwrap_or_default(),
                reason: e.message().to_string(),
            })?;

        let config = Self {
            values,
            source: origin.map(Path::to_path_buf),
        };
        config.validate()?;

        tracing::debug!(
            source = ?config.source,
            keys = config.values.len(),
            "configuration loaded"
        );
        Ok(config)
    }
}
