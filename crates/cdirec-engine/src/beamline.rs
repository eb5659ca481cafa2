use cdirec_config::{RunConfig, keys};

/// Diffractometer the data was measured on.
///
/// Informational only; it is logged with the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diffractometer {
    det_name: String,
}

impl Diffractometer {
    #[must_use]
    pub fn new(det_name: impl Into<String>) -> Self {
        Self {
            det_name: det_name.into(),
        }
    }

    #[must_use]
    pub fn det_name(&self) -> &str {
        &self.det_name
    }

    /// Record named by the `diffractometer` key, if present.
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Option<Self> {
        config.get_str(keys::DIFFRACTOMETER).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = RunConfig::builder().diffractometer("34idc").build().unwrap();
        let diff = Diffractometer::from_config(&config).unwrap();
        assert_eq!(diff.det_name(), "34idc");
        assert!(Diffractometer::from_config(&RunConfig::builder().build().unwrap()).is_none());
    }
}
