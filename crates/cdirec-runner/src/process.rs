use crate::error::RunnerError;
use std::time::Duration;

use super::CommandSpec;

/// Output from a finished external program.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Last `max_lines` lines of stderr, for error reports.
    #[must_use]
    pub fn stderr_tail(&self, max_lines: usize) -> String {
        let stderr = self.stderr_string();
        let lines: Vec<&str> = stderr.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }

    /// Exit status as a solver status code; a signal kill maps to `-1`.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Synchronous process execution.
///
/// Implementations MUST use argv-style APIs only. The reconstruction run is
/// single-threaded and blocking, so this trait exposes no async surface.
pub trait ProcessRunner {
    /// Run `cmd` to completion, or until `timeout` elapses when one is given.
    ///
    /// Returns `Ok` for any exit status, including nonzero ones.
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd, timeout)
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for Box<R> {
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd, timeout)
    }
}
