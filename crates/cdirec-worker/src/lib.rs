//! Solver worker lifecycle for cdirec
//!
//! A worker owns one reconstruction's numeric state and, once acquired, one
//! compute device. [`drive_worker`] walks it through
//! `Created → DeviceBound → Initialized → Iterated → {Saved | Unsaved} → Cleared`
//! and releases it on every exit path.

mod lifecycle;
mod process;
mod worker;

pub use lifecycle::{LifecycleOutcome, choose_device, drive_worker};
pub use process::{DEFAULT_SOLVER, ProcessWorker, ProcessWorkerFactory};
pub use worker::{Worker, WorkerFactory};
