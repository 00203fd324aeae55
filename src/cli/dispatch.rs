//! Command dispatch, kept out of the binary.

use std::path::Path;

use anyhow::Result;

use super::{
    args::Commands,
    handlers::{handle_compare, handle_events, handle_graph, handle_init, handle_metrics, handle_run},
};
use crate::config::{Config, CONFIG_FILE};
use crate::exit::RefAgentExit;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands, config: &Config) -> Result<RefAgentExit> {
    match command {
        Commands::Run {
            project,
            class,
            single_agent,
        } => handle_run(config, &project, class.as_deref(), single_agent),
        Commands::Graph { project, class } => handle_graph(config, &project, &class),
        Commands::Metrics { file } => handle_metrics(config, &file),
        Commands::Events { dir, output } => handle_events(&dir, &output),
        Commands::Compare {
            oracle,
            developer,
            valid_types,
            json,
        } => handle_compare(&oracle, &developer, &valid_types, json),
        Commands::Init { force } => handle_init(config, Path::new(CONFIG_FILE), force),
    }
}
