//! Reconstruction configuration for cdirec
//!
//! A [`RunConfig`] is the immutable key → value mapping read once from a
//! reconstruction config file (`config_rec`, `config_rec_<suffix>`, …). The
//! keys the run controller understands have typed accessors; every other key
//! is carried untouched for the solver.

mod builder;
mod load;
mod model;
mod validation;

pub use builder::RunConfigBuilder;
pub use model::{DeviceSpec, InitGuess, RunConfig, keys};
