use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use strum::IntoEnumIterator;

use cdirec_utils::error::BackendError;

use crate::engines::{AfLib, ArrayLib, CpLib, DeviceBinding, NpLib};
use crate::kind::{BackendKind, Dims, LibraryName, SubBackend, resolve_kind};

/// Every concrete engine, built once at startup.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    engines: HashMap<BackendKind, Arc<dyn ArrayLib>>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut engines: HashMap<BackendKind, Arc<dyn ArrayLib>> = HashMap::new();
        for dims in Dims::iter() {
            let subs = std::iter::once(None).chain(SubBackend::iter().map(Some));
            for sub in subs {
                let lib = AfLib::new(dims, sub);
                engines.insert(lib.kind(), Arc::new(lib));
            }
        }
        engines.insert(BackendKind::Cp, Arc::new(CpLib));
        engines.insert(BackendKind::Np, Arc::new(NpLib));
        Self { engines }
    }

    /// Select the engine for `name` and data rank `ndim`.
    ///
    /// Selection is pure: the same inputs always give an equal handle.
    pub fn select(&self, name: &str, ndim: usize) -> Result<BackendHandle, BackendError> {
        let library = LibraryName::parse(name)?;
        let kind = resolve_kind(library, ndim)?;
        let engine = self
            .engines
            .get(&kind)
            .cloned()
            .ok_or_else(|| BackendError::UnknownBackend {
                name: name.to_string(),
            })?;

        tracing::info!(library = %library, ndim, backend = %kind, "backend selected");
        Ok(BackendHandle { library, engine })
    }

    /// Number of registered engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

/// The engine a run is bound to.
///
/// Cheap to clone; two handles are equal when they name the same engine.
#[derive(Clone)]
pub struct BackendHandle {
    library: LibraryName,
    engine: Arc<dyn ArrayLib>,
}

impl BackendHandle {
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.engine.kind()
    }

    /// Library name the handle was selected with.
    #[must_use]
    pub fn library(&self) -> LibraryName {
        self.library
    }

    #[must_use]
    pub fn solver_args(&self) -> Vec<String> {
        self.engine.solver_args()
    }

    pub fn bind_device(&self, device: i32) -> Result<DeviceBinding, BackendError> {
        self.engine.bind_device(device)
    }
}

impl PartialEq for BackendHandle {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for BackendHandle {}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("library", &self.library)
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}
