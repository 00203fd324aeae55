//! Subprocess execution with timeouts, and the build/test seam.

mod build;
mod runner;

pub use crate::types::{CommandOutcome, CommandResult};
pub use build::{BuildTool, MavenTool};
pub use runner::{expand_template, run_command};
