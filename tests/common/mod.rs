//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cdirec::{
    BackendHandle, BackendKind, CdiError, DataSet, DeviceSpec, GuessError, GuessGenerator,
    RunConfig, Worker, WorkerFactory,
};
use ndarray::{ArrayD, IxDyn};
use ndarray_npy::WriteNpyExt;

/// Calls observed by a [`RecordingWorker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { backend: BackendKind, data: PathBuf },
    Acquire(DeviceSpec),
    Initialize(Option<PathBuf>),
    Iterate,
    Save(PathBuf),
    Release,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Worker that records every call and follows a script.
pub struct RecordingWorker {
    log: CallLog,
    acquire_status: i32,
    iterate_status: i32,
}

impl Worker for RecordingWorker {
    fn acquire_device(&mut self, device: &DeviceSpec) -> i32 {
        self.log.borrow_mut().push(Call::Acquire(device.clone()));
        self.acquire_status
    }

    fn initialize(&mut self, seed_dir: Option<&Path>) -> Result<(), CdiError> {
        self.log
            .borrow_mut()
            .push(Call::Initialize(seed_dir.map(Path::to_path_buf)));
        Ok(())
    }

    fn iterate(&mut self) -> Result<i32, CdiError> {
        self.log.borrow_mut().push(Call::Iterate);
        Ok(self.iterate_status)
    }

    fn save(&mut self, save_dir: &Path) -> Result<(), CdiError> {
        self.log.borrow_mut().push(Call::Save(save_dir.to_path_buf()));
        fs::create_dir_all(save_dir)?;
        fs::write(save_dir.join("image.npy"), b"image")?;
        fs::write(save_dir.join("support.npy"), b"support")?;
        Ok(())
    }

    fn release(&mut self) {
        self.log.borrow_mut().push(Call::Release);
    }
}

/// Factory for [`RecordingWorker`]s sharing one call log.
#[derive(Default)]
pub struct RecordingFactory {
    pub log: CallLog,
    pub acquire_status: i32,
    pub iterate_status: i32,
}

impl RecordingFactory {
    pub fn with_statuses(acquire_status: i32, iterate_status: i32) -> Self {
        Self {
            log: CallLog::default(),
            acquire_status,
            iterate_status,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}

impl WorkerFactory for RecordingFactory {
    type Worker = RecordingWorker;

    fn create(
        &self,
        _config: &RunConfig,
        data_path: &Path,
        backend: &BackendHandle,
    ) -> Result<RecordingWorker, CdiError> {
        self.log.borrow_mut().push(Call::Create {
            backend: backend.kind(),
            data: data_path.to_path_buf(),
        });
        Ok(RecordingWorker {
            log: Rc::clone(&self.log),
            acquire_status: self.acquire_status,
            iterate_status: self.iterate_status,
        })
    }
}

/// Guess generator that writes a seed file and records its inputs.
#[derive(Default)]
pub struct StubGenerator {
    pub calls: RefCell<Vec<(Vec<usize>, PathBuf, PathBuf)>>,
}

impl GuessGenerator for StubGenerator {
    fn run_guess(&self, data: &DataSet, model: &Path, out_dir: &Path) -> Result<(), GuessError> {
        self.calls.borrow_mut().push((
            data.shape().to_vec(),
            model.to_path_buf(),
            out_dir.to_path_buf(),
        ));
        fs::write(out_dir.join("image.npy"), b"seed").map_err(|e| GuessError::PrepareFailed {
            dir: out_dir.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Experiment directory with `conf/<config_name>` and `data/data.npy`.
pub struct Experiment {
    pub temp: tempfile::TempDir,
}

impl Experiment {
    pub fn new() -> Self {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("conf")).unwrap();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        Self { temp }
    }

    pub fn dir(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir().join("conf").join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_data(&self, shape: &[usize]) -> PathBuf {
        let path = self.dir().join("data").join("data.npy");
        let array = ArrayD::<f32>::from_elem(IxDyn(shape), 1.5);
        let mut buf = Vec::new();
        array.write_npy(&mut buf).unwrap();
        fs::write(&path, buf).unwrap();
        path
    }
}

/// Every file under `dir`, recursively.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(files_under(&path));
            } else {
                files.push(path);
            }
        }
    }
    files
}
