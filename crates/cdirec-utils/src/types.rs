//! Shared serializable types

use serde::{Deserialize, Serialize};

/// Error kinds for machine-readable run summaries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    DataLoad,
    Backend,
    DeviceAcquisition,
    SolveFailure,
    Worker,
    AiGuess,
    Internal,
}

/// Lifecycle position of a solver worker.
///
/// `Created → DeviceBound → Initialized → Iterated → {Saved | Unsaved} → Cleared`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Created,
    DeviceBound,
    Initialized,
    Iterated,
    Saved,
    Unsaved,
    Cleared,
}

impl WorkerState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DeviceBound => "device_bound",
            Self::Initialized => "initialized",
            Self::Iterated => "iterated",
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
            Self::Cleared => "cleared",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
