use anyhow::{Context, Result};
use ndarray::ArrayD;
use ndarray_npy::WriteNpyExt;
use std::path::{Path, PathBuf};

use cdirec_utils::atomic_write::write_bytes_atomic;
use cdirec_utils::error::DataLoadError;

use crate::format::DataFormat;
use crate::{npy, tif};

/// Measured diffraction intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    array: ArrayD<f32>,
    source: PathBuf,
}

impl DataSet {
    /// Load a data file, dispatching on its extension.
    ///
    /// Fails with [`DataLoadError::UnsupportedFormat`] before touching the
    /// file when the extension is not `.tif`, `.tiff` or `.npy`.
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let format = DataFormat::from_path(path).ok_or_else(|| DataLoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let array = match format {
            DataFormat::Tiff => tif::read_tiff(path),
            DataFormat::Npy => npy::read_npy(path),
        }
        .map_err(|reason| DataLoadError::ReadFailed {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::debug!(
            path = %path.display(),
            %format,
            shape = ?array.shape(),
            "data loaded"
        );

        Ok(Self {
            array,
            source: path.to_path_buf(),
        })
    }

    /// Wrap an in-memory array; `source` is informational.
    #[must_use]
    pub fn from_array(array: ArrayD<f32>, source: impl Into<PathBuf>) -> Self {
        Self {
            array,
            source: source.into(),
        }
    }

    /// Number of axes; selects the af backend variant.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.array.ndim()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    #[must_use]
    pub fn array(&self) -> &ArrayD<f32> {
        &self.array
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Write the intensities as an `.npy` file, atomically.
    pub fn write_npy(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        self.array
            .write_npy(&mut buf)
            .with_context(|| format!("Failed to encode {}", path.display()))?;
        write_bytes_atomic(path, &buf)
    }
}
