use crate::error::RunnerError;
use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{CommandSpec, ProcessOutput, ProcessRunner, RingBuffer};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default stdout kept per run; solvers report progress there.
pub const DEFAULT_STDOUT_LIMIT: usize = 64 * 1024;

/// Default stderr kept per run; failure reports read its tail.
pub const DEFAULT_STDERR_LIMIT: usize = 256 * 1024;

/// Runs programs with `std::process`, polling for exit.
///
/// On unix the child leads its own process group. Once the leader exits, or
/// the deadline passes, the whole group is killed so helpers the solver forked
/// (MPI ranks, python workers) cannot outlive it or hold its pipes open.
/// Output is kept in bounded [`RingBuffer`]s.
#[derive(Debug, Clone, Copy)]
pub struct NativeRunner {
    stdout_limit: usize,
    stderr_limit: usize,
}

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stdout_limit: DEFAULT_STDOUT_LIMIT,
            stderr_limit: DEFAULT_STDERR_LIMIT,
        }
    }

    /// Keep at most `stdout` and `stderr` bytes of each stream.
    #[must_use]
    pub const fn with_capture_limits(mut self, stdout: usize, stderr: usize) -> Self {
        self.stdout_limit = stdout;
        self.stderr_limit = stderr;
        self
    }
}

impl Default for NativeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for NativeRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError> {
        let program = cmd.display_program();
        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        tracing::debug!(command = %cmd, timeout_secs = ?timeout.map(|t| t.as_secs()), "spawning");
        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout = drain(child.stdout.take(), self.stdout_limit);
        let stderr = drain(child.stderr.take(), self.stderr_limit);

        let deadline = timeout.map(|t| Instant::now() + t);
        let waited = wait_until(&mut child, deadline).map_err(|e| RunnerError::WaitFailed {
            program: program.clone(),
            reason: e.to_string(),
        });
        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                kill_group(&mut child);
                let _ = child.wait();
                let timeout_seconds = timeout.map_or(0, |t| t.as_secs());
                tracing::warn!(program = %program, timeout_secs = timeout_seconds, "killed after timeout");
                return Err(RunnerError::Timeout {
                    program,
                    timeout_seconds,
                });
            }
            Err(err) => {
                kill_group(&mut child);
                let _ = child.wait();
                return Err(err);
            }
        };

        if kill_group(&mut child) {
            tracing::warn!(program = %program, "killed helper processes left behind");
        }

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        if stderr.was_truncated() {
            tracing::debug!(
                program = %program,
                total_bytes = stderr.total_bytes_written(),
                kept_bytes = stderr.len(),
                "stderr truncated"
            );
        }

        Ok(ProcessOutput::new(
            stdout.into_bytes(),
            stderr.into_bytes(),
            status.code(),
        ))
    }
}

/// Read a pipe to the end on its own thread so the child never blocks on a
/// full pipe buffer; only the last `limit` bytes are kept.
fn drain<P: Read + Send + 'static>(pipe: Option<P>, limit: usize) -> Option<JoinHandle<RingBuffer>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut ring = RingBuffer::new(limit);
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => ring.write(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
            ring
        })
    })
}

fn collect(reader: Option<JoinHandle<RingBuffer>>) -> RingBuffer {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_else(|| RingBuffer::new(0))
}

/// `Ok(None)` when `deadline` passes first; no deadline waits indefinitely.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let pause = match deadline {
            None => POLL_INTERVAL,
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                POLL_INTERVAL.min(deadline - now)
            }
        };
        thread::sleep(pause);
    }
}

/// SIGKILL every process in the child's group. Returns whether anything was
/// still there to signal.
///
/// The group id outlives a reaped leader while any member is alive, and it is
/// not handed out as a new pid while the group exists.
#[cfg(unix)]
fn kill_group(child: &mut Child) -> bool {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return child.kill().is_ok();
    };
    // SAFETY: killpg only sends a signal; `pgid` is the group this runner
    // created for the child.
    unsafe { libc::killpg(pgid, libc::SIGKILL) == 0 }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) -> bool {
    let _ = child.kill();
    false
}
