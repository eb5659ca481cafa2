//! CLI entry point and dispatch
//!
//! `run()` handles all output including errors and returns the exit code to
//! use; main.rs only maps it to the process exit.

use clap::Parser;

use cdirec_utils::ExitCode;
use cdirec_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;

pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Run(args) => commands::execute_run_command(&args),
        Commands::Backends { json } => commands::execute_backends_command(json).map_err(|e| {
            eprintln!("Error: {e:#}");
            ExitCode::INTERNAL
        }),
    }
}
