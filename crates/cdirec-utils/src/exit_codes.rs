//! Exit codes for the cdirec CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Results saved |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CONFIG` | Invalid CLI arguments or configuration |
//! | 3 | `DATA_LOAD` | Data file unsupported or unreadable |
//! | 4 | `BACKEND` | Unknown library or unsupported dimensionality |
//! | 5 | `DEVICE` | Device acquisition failed |
//! | 6 | `SOLVE_FAILED` | Solver did not converge or crashed |
//! | 7 | `AI_GUESS` | AI guess generation failed |

/// Process exit status for a reconstruction run.
///
/// The numeric values are part of the public API.
///
/// # Example
///
/// ```rust
/// use cdirec_utils::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(6), ExitCode::SOLVE_FAILED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - results were saved
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Configuration or CLI argument error
    pub const CONFIG: ExitCode = ExitCode(2);

    /// Data file could not be loaded
    pub const DATA_LOAD: ExitCode = ExitCode(3);

    /// Backend could not be selected
    pub const BACKEND: ExitCode = ExitCode(4);

    /// Compute device could not be acquired
    pub const DEVICE: ExitCode = ExitCode(5);

    /// Solver returned a nonzero status or crashed
    pub const SOLVE_FAILED: ExitCode = ExitCode(6);

    /// AI guess generator failed
    pub const AI_GUESS: ExitCode = ExitCode(7);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
