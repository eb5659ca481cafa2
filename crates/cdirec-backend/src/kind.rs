use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use cdirec_utils::error::BackendError;

/// Library names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum LibraryName {
    /// af family, default sub-backend
    Af,
    Cpu,
    Opencl,
    Cuda,
    /// GPU array library
    Cp,
    /// CPU array library
    Np,
}

impl LibraryName {
    /// Parse a library name, mapping anything unrecognized to `UnknownBackend`.
    pub fn parse(name: &str) -> Result<Self, BackendError> {
        Self::from_str(name).map_err(|_| BackendError::UnknownBackend {
            name: name.to_string(),
        })
    }

    /// Sub-backend this name layers on the af family, if any.
    #[must_use]
    pub fn sub_backend(self) -> Option<SubBackend> {
        match self {
            Self::Cpu => Some(SubBackend::Cpu),
            Self::Opencl => Some(SubBackend::Opencl),
            Self::Cuda => Some(SubBackend::Cuda),
            Self::Af | Self::Cp | Self::Np => None,
        }
    }

    #[must_use]
    pub fn is_af_family(self) -> bool {
        matches!(self, Self::Af | Self::Cpu | Self::Opencl | Self::Cuda)
    }
}

/// Data rank supported by the af family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Dims {
    One,
    Two,
    Three,
}

impl Dims {
    #[must_use]
    pub fn from_ndim(ndim: usize) -> Option<Self> {
        match ndim {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    #[must_use]
    pub fn ndim(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Execution target layered on top of the af family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SubBackend {
    Cpu,
    Opencl,
    Cuda,
}

/// Concrete numeric engine a run is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Af { dims: Dims, sub: Option<SubBackend> },
    Cp,
    Np,
}

impl BackendKind {
    /// Whether the engine runs on the host CPU only.
    #[must_use]
    pub fn is_cpu_only(self) -> bool {
        matches!(
            self,
            Self::Np
                | Self::Af {
                    sub: Some(SubBackend::Cpu),
                    ..
                }
        )
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Af { dims, sub: None } => write!(f, "af{}d", dims.ndim()),
            Self::Af {
                dims,
                sub: Some(sub),
            } => write!(f, "af{}d/{sub}", dims.ndim()),
            Self::Cp => write!(f, "cp"),
            Self::Np => write!(f, "np"),
        }
    }
}

/// Resolve the engine for a library and data rank.
///
/// The af family needs a rank in 1..=3; `cp` and `np` ignore it.
pub fn resolve_kind(library: LibraryName, ndim: usize) -> Result<BackendKind, BackendError> {
    match library {
        LibraryName::Af | LibraryName::Cpu | LibraryName::Opencl | LibraryName::Cuda => {
            let dims = Dims::from_ndim(ndim).ok_or_else(|| BackendError::UnsupportedDimensionality {
                library: library.to_string(),
                ndim,
            })?;
            Ok(BackendKind::Af {
                dims,
                sub: library.sub_backend(),
            })
        }
        LibraryName::Cp => Ok(BackendKind::Cp),
        LibraryName::Np => Ok(BackendKind::Np),
    }
}
