use cdirec_utils::error::ConfigError;

use crate::model::{RunConfig, keys};

/// Upper bound for `solver_timeout_secs` (one week).
const MAX_SOLVER_TIMEOUT_SECS: i64 = 7 * 24 * 3600;

impl RunConfig {
    /// Validate the types of the keys the controller interprets.
    ///
    /// Unrecognized keys are left alone; they belong to the solver.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for key in [
            keys::INIT_GUESS,
            keys::CONTINUE_DIR,
            keys::AI_TRAINED_MODEL,
            keys::SAVE_DIR,
            keys::DIFFRACTOMETER,
        ] {
            if let Some(value) = self.values.get(key)
                && !value.is_str()
            {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: format!("expected a string, found {}", value.type_str()),
                });
            }
        }

        if let Some(value) = self.values.get(keys::DEVICE) {
            validate_device(value)?;
        }

        if let Some(value) = self.values.get(keys::SOLVER_TIMEOUT_SECS) {
            match value.as_integer() {
                Some(secs) if secs <= 0 => {
                    return Err(ConfigError::InvalidValue {
                        key: keys::SOLVER_TIMEOUT_SECS.to_string(),
                        value: "must be greater than 0".to_string(),
                    });
                }
                Some(secs) if secs > MAX_SOLVER_TIMEOUT_SECS => {
                    return Err(ConfigError::InvalidValue {
                        key: keys::SOLVER_TIMEOUT_SECS.to_string(),
                        value: "exceeds maximum limit of 604800 seconds (1 week)".to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    return Err(ConfigError::InvalidValue {
                        key: keys::SOLVER_TIMEOUT_SECS.to_string(),
                        value: format!("expected an integer, found {}", value.type_str()),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_device(value: &toml::Value) -> Result<(), ConfigError> {
    let ids: Vec<&toml::Value> = match value {
        toml::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for id in ids {
        match id.as_integer() {
            Some(id) if id < -1 => {
                return Err(ConfigError::InvalidValue {
                    key: keys::DEVICE.to_string(),
                    value: format!("device id {id} is below -1"),
                });
            }
            Some(id) if id > i64::from(i32::MAX) => {
                return Err(ConfigError::InvalidValue {
                    key: keys::DEVICE.to_string(),
                    value: format!("device id {id} is out of range"),
                });
            }
            Some(_) => {}
            None => {
                return Err(ConfigError::InvalidValue {
                    key: keys::DEVICE.to_string(),
                    value: format!("expected an integer, found {}", id.type_str()),
                });
            }
        }
    }
    Ok(())
}
