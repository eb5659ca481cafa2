//! `cdirec run`

use cdirec_config::DeviceSpec;
use cdirec_engine::{CommandGuessGenerator, RunController, RunRequest};
use cdirec_utils::ExitCode;
use cdirec_worker::ProcessWorkerFactory;

use crate::cli::args::RunArgs;
use crate::summary::RunSummary;

/// Run one reconstruction and report the result.
pub fn execute_run_command(args: &RunArgs) -> Result<(), ExitCode> {
    let mut request = RunRequest::new(
        args.library.as_str(),
        &args.config,
        &args.data,
        &args.parent_dir,
    );
    if !args.device.is_empty() {
        request.device = Some(DeviceSpec::from(args.device.clone()));
    }

    tracing::debug!(?request, solver = %args.solver.display(), "dispatching run");

    let controller = RunController::new(
        ProcessWorkerFactory::new(&args.solver),
        CommandGuessGenerator::new(&args.ai_guess_cmd),
    );

    match controller.run(&request) {
        Ok(report) => {
            if args.json {
                print_summary(&RunSummary::from_report(&report))?;
            } else {
                println!("✓ results saved to {}", report.save_dir.display());
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                print_summary(&RunSummary::from_error(&err))?;
            } else {
                eprint!("{}", err.display_for_user());
            }
            Err(err.to_exit_code())
        }
    }
}

fn print_summary(summary: &RunSummary) -> Result<(), ExitCode> {
    let json = summary.to_json().map_err(|e| {
        eprintln!("Error: failed to encode run summary: {e}");
        ExitCode::INTERNAL
    })?;
    println!("{json}");
    Ok(())
}
