//! Structured logging for reconstruction runs
//!
//! Every run executes inside a [`run_span`]; stages are bracketed with
//! [`StageTimer`] so start, completion and abort carry the same fields.

use std::time::Instant;
use tracing::{Level, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode enables debug output for
/// cdirec crates and records span close events with their duration.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("cdirec=debug,info")
            } else {
                EnvFilter::try_new("cdirec=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one reconstruction run.
pub fn run_span(config_name: &str, library: &str, data_file: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "reconstruction",
        config = %config_name,
        library = %library,
        data = %data_file,
    )
}

/// Times one stage of a run and logs its outcome.
#[derive(Debug)]
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    #[must_use]
    pub fn start(stage: &'static str) -> Self {
        tracing::debug!(stage, "stage started");
        Self {
            stage,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn complete(self) {
        info!(
            stage = self.stage,
            duration_ms = %self.elapsed_ms(),
            "stage completed"
        );
    }

    /// Stage finished but with a non-fatal problem (e.g. nonzero solve status).
    pub fn degrade(self, reason: &str) {
        warn!(
            stage = self.stage,
            duration_ms = %self.elapsed_ms(),
            reason = %reason,
            "stage finished with problems"
        );
    }

    pub fn abort(self, reason: &str) {
        error!(
            stage = self.stage,
            duration_ms = %self.elapsed_ms(),
            reason = %reason,
            "run aborted"
        );
    }
}
