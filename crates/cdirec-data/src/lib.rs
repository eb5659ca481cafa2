//! Diffraction data loading for cdirec
//!
//! The data file format is chosen by extension: `.tif`/`.tiff` files are read
//! page by page, `.npy` files are read as NumPy arrays of any numeric dtype.
//! Either way the result is a [`DataSet`] of `f32` intensities whose rank
//! drives backend selection.

mod dataset;
mod format;
mod npy;
mod tif;

pub use dataset::DataSet;
pub use format::DataFormat;
