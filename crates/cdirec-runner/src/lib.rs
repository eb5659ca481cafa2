//! External program execution for cdirec
//!
//! The numeric solver and the AI-guess generator are separate programs. Every
//! invocation goes through [`CommandSpec`] so arguments cross the process
//! boundary as discrete argv elements and never through a shell.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;
pub mod ring_buffer;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
pub use ring_buffer::RingBuffer;
