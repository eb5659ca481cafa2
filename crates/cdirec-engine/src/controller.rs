use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cdirec_backend::{BackendHandle, BackendRegistry};
use cdirec_config::{DeviceSpec, RunConfig};
use cdirec_data::DataSet;
use cdirec_utils::CdiError;
use cdirec_utils::logging::{StageTimer, run_span};
use cdirec_utils::paths::derive_save_dir;
use cdirec_worker::{LifecycleOutcome, WorkerFactory, choose_device, drive_worker};

use crate::beamline::Diffractometer;
use crate::guess::GuessGenerator;
use crate::plan::{InitialGuessPlan, resolve_plan};

/// Inputs of one reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Library name, e.g. `af`, `cuda`, `cp`, `np`
    pub library: String,
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    /// Experiment or scan directory results are placed under
    pub parent_dir: PathBuf,
    /// Explicit device request; falls back to `config.device`
    pub device: Option<DeviceSpec>,
}

impl RunRequest {
    #[must_use]
    pub fn new(
        library: impl Into<String>,
        config_path: impl Into<PathBuf>,
        data_path: impl Into<PathBuf>,
        parent_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            library: library.into(),
            config_path: config_path.into(),
            data_path: data_path.into(),
            parent_dir: parent_dir.into(),
            device: None,
        }
    }

    #[must_use]
    pub fn with_device(mut self, device: impl Into<DeviceSpec>) -> Self {
        self.device = Some(device.into());
        self
    }
}

/// A completed reconstruction whose results were saved.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub backend: BackendHandle,
    pub plan: InitialGuessPlan,
    pub save_dir: PathBuf,
    pub outcome: LifecycleOutcome,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

/// Drives one reconstruction from config to saved results.
#[derive(Debug)]
pub struct RunController<F, G> {
    registry: BackendRegistry,
    factory: F,
    generator: G,
}

impl<F: WorkerFactory, G: GuessGenerator> RunController<F, G> {
    #[must_use]
    pub fn new(factory: F, generator: G) -> Self {
        Self {
            registry: BackendRegistry::new(),
            factory,
            generator,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run one reconstruction.
    ///
    /// Any failure before the worker exists leaves no worker resources
    /// behind. Once the worker exists it is released on every path. A solve
    /// that does not converge is reported as [`CdiError::SolveFailed`] and a
    /// rejected device as [`CdiError::DeviceAcquisition`].
    pub fn run(&self, request: &RunRequest) -> Result<RunReport, CdiError> {
        let started_at = Utc::now();
        let started = Instant::now();

        let config_name = file_name(&request.config_path);
        let span = run_span(
            &config_name,
            &request.library,
            &request.data_path.display().to_string(),
        );
        let _entered = span.enter();

        let config = stage("load_config", || RunConfig::load(&request.config_path))?;
        if let Some(diffractometer) = Diffractometer::from_config(&config) {
            tracing::info!(detector = diffractometer.det_name(), "diffractometer");
        }

        let data = stage("load_data", || DataSet::load(&request.data_path))?;

        let backend = stage("select_backend", || {
            self.registry.select(&request.library, data.ndim())
        })?;

        let plan = stage("resolve_guess", || {
            resolve_plan(&config, &request.parent_dir, &data, &self.generator)
        })?;

        let save_dir = config
            .save_dir()
            .unwrap_or_else(|| derive_save_dir(&request.config_path, &request.parent_dir));
        tracing::debug!(save_dir = %save_dir.display(), "save directory");

        let mut worker = stage("create_worker", || {
            self.factory.create(&config, &request.data_path, &backend)
        })?;
        let device = choose_device(request.device.as_ref(), &config);
        let outcome = drive_worker(&mut worker, &device, plan.seed_dir(), &save_dir)?;
        drop(worker);

        match outcome {
            LifecycleOutcome::DeviceRejected { device, status } => {
                Err(CdiError::DeviceAcquisition { device, status })
            }
            LifecycleOutcome::Unsaved { status } => Err(CdiError::SolveFailed { status }),
            LifecycleOutcome::Saved { .. } => Ok(RunReport {
                backend,
                plan,
                save_dir,
                outcome,
                started_at,
                duration_ms: started.elapsed().as_millis(),
            }),
        }
    }
}

/// Run `f` as a timed stage; errors are logged as the run's abort reason.
fn stage<T, E, F>(name: &'static str, f: F) -> Result<T, CdiError>
where
    E: Into<CdiError>,
    F: FnOnce() -> Result<T, E>,
{
    let timer = StageTimer::start(name);
    match f() {
        Ok(value) => {
            timer.complete();
            Ok(value)
        }
        Err(err) => {
            let err = err.into();
            timer.abort(&err.to_string());
            Err(err)
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = RunRequest::new("af", "conf/config_rec", "data.npy", "/exp").with_device(2);
        assert_eq!(request.device, Some(DeviceSpec::from(2)));
        assert_eq!(request.library, "af");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/exp/conf/config_rec_ga")), "config_rec_ga");
        assert_eq!(file_name(Path::new("/")), "");
    }
}
