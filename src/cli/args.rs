//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cdirec_engine::DEFAULT_AI_GUESS_CMD;
use cdirec_worker::DEFAULT_SOLVER;

/// cdirec - run a single CDI phase-retrieval reconstruction
#[derive(Parser, Debug)]
#[command(name = "cdirec")]
#[command(about = "Run a single coherent-diffraction-imaging phase-retrieval reconstruction")]
#[command(long_about = r#"
cdirec selects the numeric backend for the data, resolves how the reconstruction
is seeded (random, continuation, or AI guess), runs the solver and saves its
results under the experiment directory.

EXAMPLES:
  # 3-D data on GPU 0 through the af family's cuda backend
  cdirec run cuda conf/config_rec data/data.tif /exp/scan_54 --device 0

  # CPU array library, machine-readable result
  cdirec run np conf/config_rec_ga data/data.npy /exp/scan_54 --json

  # Show which engine each library name resolves to
  cdirec backends

RESULTS:
  Results go to save_dir from the config, or to <PARENT_DIR>/results_phasing[_<suffix>]
  derived from the config file name config_rec[_<suffix>]. AI guess seeds are
  written to <PARENT_DIR>/results_AI.
"#)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconstruction
    Run(RunArgs),

    /// List library names and the engine each resolves to
    Backends {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Processing library: af, cpu, opencl, cuda, cp or np
    pub library: String,

    /// Reconstruction config file
    pub config: PathBuf,

    /// Diffraction data file (.tif, .tiff or .npy)
    pub data: PathBuf,

    /// Experiment or scan directory that holds the results
    pub parent_dir: PathBuf,

    /// Device id; repeat for several. -1 lets the backend decide.
    /// Overrides the config's device key.
    #[arg(long = "device", value_name = "ID", allow_negative_numbers = true)]
    pub device: Vec<i32>,

    /// Solver program
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_SOLVER)]
    pub solver: PathBuf,

    /// AI guess generator program
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_AI_GUESS_CMD)]
    pub ai_guess_cmd: PathBuf,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
