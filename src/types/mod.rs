//! Small data types shared across modules.

mod command;

pub use command::{CommandOutcome, CommandResult};
