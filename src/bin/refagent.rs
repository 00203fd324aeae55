use clap::Parser;
use colored::Colorize;
use refagent_core::cli::{self, Cli};
use refagent_core::config::Config;
use refagent_core::exit::RefAgentExit;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> RefAgentExit {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return RefAgentExit::Success;
    };

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "error:".red());
            return RefAgentExit::InvalidInput;
        }
    };
    config.verbose = cli.verbose;

    match cli::dispatch::execute(command, &config) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red());
            RefAgentExit::Error
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "refagent_core=debug" } else { "refagent_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
