use std::collections::BTreeMap;
use std::fmt;

use cdirec_utils::error::BackendError;

use crate::kind::{BackendKind, Dims, SubBackend};

/// Device id meaning "let the backend decide".
pub const BACKEND_DECIDES: i32 = -1;

/// How the solver process is bound to a compute device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceBinding {
    /// Concrete device bound, or `None` when the backend decides
    pub device: Option<i32>,
    /// Extra solver arguments
    pub args: Vec<String>,
    /// Environment exported to the solver process
    pub env: BTreeMap<String, String>,
}

impl DeviceBinding {
    /// Binding that leaves device choice to the backend.
    #[must_use]
    pub fn backend_decides() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.device.is_some()
    }
}

/// Capability shared by every numeric engine the solver can bind to.
pub trait ArrayLib: fmt::Debug + Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Arguments telling the solver which engine to load.
    fn solver_args(&self) -> Vec<String>;

    /// Translate a requested device id into a binding for this engine.
    fn bind_device(&self, device: i32) -> Result<DeviceBinding, BackendError>;
}

fn reject_below_backend_decides(kind: BackendKind, device: i32) -> Result<(), BackendError> {
    if device < BACKEND_DECIDES {
        return Err(BackendError::DeviceRejected {
            backend: kind.to_string(),
            device,
            reason: "device ids are -1 or a non-negative GPU index".to_string(),
        });
    }
    Ok(())
}

fn ignore_on_cpu(kind: BackendKind, device: i32) -> DeviceBinding {
    if device != BACKEND_DECIDES {
        tracing::warn!(backend = %kind, device, "CPU engine ignores device id");
    }
    DeviceBinding::backend_decides()
}

/// af family engine for one rank, optionally routed through a sub-backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfLib {
    dims: Dims,
    sub: Option<SubBackend>,
}

impl AfLib {
    #[must_use]
    pub fn new(dims: Dims, sub: Option<SubBackend>) -> Self {
        Self { dims, sub }
    }
}

impl ArrayLib for AfLib {
    fn kind(&self) -> BackendKind {
        BackendKind::Af {
            dims: self.dims,
            sub: self.sub,
        }
    }

    fn solver_args(&self) -> Vec<String> {
        let mut args = vec![
            "--lib".to_string(),
            "af".to_string(),
            "--dims".to_string(),
            self.dims.ndim().to_string(),
        ];
        if let Some(sub) = self.sub {
            args.push("--af-backend".to_string());
            args.push(sub.to_string());
        }
        args
    }

    fn bind_device(&self, device: i32) -> Result<DeviceBinding, BackendError> {
        let kind = self.kind();
        reject_below_backend_decides(kind, device)?;
        if device == BACKEND_DECIDES || kind.is_cpu_only() {
            return Ok(ignore_on_cpu(kind, device));
        }
        Ok(DeviceBinding {
            device: Some(device),
            args: vec!["--device".to_string(), device.to_string()],
            env: BTreeMap::new(),
        })
    }
}

/// GPU array library, rank independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpLib;

impl ArrayLib for CpLib {
    fn kind(&self) -> BackendKind {
        BackendKind::Cp
    }

    fn solver_args(&self) -> Vec<String> {
        vec!["--lib".to_string(), "cp".to_string()]
    }

    fn bind_device(&self, device: i32) -> Result<DeviceBinding, BackendError> {
        reject_below_backend_decides(self.kind(), device)?;
        if device == BACKEND_DECIDES {
            return Ok(DeviceBinding::backend_decides());
        }
        Ok(DeviceBinding {
            device: Some(device),
            args: Vec::new(),
            env: BTreeMap::from([("CUDA_VISIBLE_DEVICES".to_string(), device.to_string())]),
        })
    }
}

/// CPU array library, rank independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpLib;

impl ArrayLib for NpLib {
    fn kind(&self) -> BackendKind {
        BackendKind::Np
    }

    fn solver_args(&self) -> Vec<String> {
        vec!["--lib".to_string(), "np".to_string()]
    }

    fn bind_device(&self, device: i32) -> Result<DeviceBinding, BackendError> {
        reject_below_backend_decides(self.kind(), device)?;
        Ok(ignore_on_cpu(self.kind(), device))
    }
}
