// src/exit.rs
//! Standardized process exit codes for `refagent`.
//!
//! Provides a stable contract for scripts driving batch runs.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RefAgentExit {
    /// Operation completed successfully.
    Success = 0,
    /// Generic error (e.g. IO, network, config).
    Error = 1,
    /// Input validation failed (missing project, unknown class, bad document).
    InvalidInput = 2,
    /// The focus class has no node in the dependency graph.
    NoDependents = 3,
    /// The metrics tool produced no output for the file.
    MetricsUnavailable = 4,
    /// At least one class in a batch run failed with an error.
    ClassFailures = 5,
}

impl RefAgentExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl Termination for RefAgentExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
