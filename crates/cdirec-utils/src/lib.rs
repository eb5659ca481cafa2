//! Foundation utilities shared by every cdirec crate.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod paths;
pub mod types;

pub use error::CdiError;
pub use exit_codes::ExitCode;
