//! Backend registry for cdirec
//!
//! A reconstruction binds to exactly one numeric engine. The engine is chosen
//! from the requested library name and, for the af family, the rank of the
//! data:
//!
//! | Library | Resolves to |
//! |---------|-------------|
//! | `af` | af family variant for 1-, 2- or 3-D data |
//! | `cpu`, `opencl`, `cuda` | af family variant routed through that sub-backend |
//! | `cp` | GPU array library, any rank |
//! | `np` | CPU array library, any rank |
//!
//! [`BackendRegistry::select`] returns a [`BackendHandle`] that the caller
//! threads into worker construction; nothing is stored globally.

mod engines;
mod kind;
mod registry;

pub use engines::{AfLib, ArrayLib, BACKEND_DECIDES, CpLib, DeviceBinding, NpLib};
pub use kind::{BackendKind, Dims, LibraryName, SubBackend, resolve_kind};
pub use registry::{BackendHandle, BackendRegistry};
