use std::fmt;
use std::path::Path;

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Tiff,
    Npy,
}

impl DataFormat {
    /// Format implied by the file extension (case-insensitive), if supported.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tif" | "tiff" => Some(Self::Tiff),
            "npy" => Some(Self::Npy),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiff => write!(f, "tiff"),
            Self::Npy => write!(f, "npy"),
        }
    }
}
