//! Reconstruction orchestration for cdirec
//!
//! [`RunController`] is the top-level driver of a single reconstruction:
//!
//! 1. load the config and the data file
//! 2. select the backend from the library name and data rank
//! 3. resolve the initial guess ([`resolve_plan`]), running the AI guess
//!    generator when requested
//! 4. compute the save directory
//! 5. construct a worker and drive it through its lifecycle

mod beamline;
mod controller;
mod guess;
mod plan;

pub use beamline::Diffractometer;
pub use controller::{RunController, RunReport, RunRequest};
pub use guess::{CommandGuessGenerator, DEFAULT_AI_GUESS_CMD, GuessGenerator, prepare_ai_dir};
pub use plan::{InitialGuessPlan, resolve_plan};
