//! CLI command implementations

mod backends;
mod reconstruct;

pub use backends::execute_backends_command;
pub use reconstruct::execute_run_command;
