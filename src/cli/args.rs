use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "refagent",
    version,
    about = "Metrics-guided LLM refactoring of Java classes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Debug-level logging (RUST_LOG still wins)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Configuration file [default: ./refagent.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refactor every non-test class of a Java project
    Run {
        project: PathBuf,
        /// Only this class
        #[arg(long)]
        class: Option<String>,
        /// Baseline mode: one direct refactor request per class
        #[arg(long)]
        single_agent: bool,
    },
    /// Build and export the pruned dependency graph of one class
    Graph { project: PathBuf, class: String },
    /// Compute and print the quality metrics of one source file
    Metrics { file: PathBuf },
    /// Flatten refactoring-mining documents into an event list
    Events {
        dir: PathBuf,
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
    /// Precision and recall of oracle refactorings against developer ones
    Compare {
        #[arg(long, value_name = "FILE")]
        oracle: PathBuf,
        #[arg(long, value_name = "FILE")]
        developer: PathBuf,
        /// Refactoring types that count; defaults to the oracle's types
        #[arg(long = "valid-type", value_name = "TYPE")]
        valid_types: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Write a refagent.toml with every default spelled out
    Init {
        #[arg(long, short)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_collects_valid_types() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "refagent",
            "compare",
            "--oracle",
            "llm.json",
            "--developer",
            "dev.json",
            "--valid-type",
            "Extract Method",
            "--valid-type",
            "Rename Method",
        ])?;
        match cli.command {
            Some(Commands::Compare { valid_types, json, .. }) => {
                assert_eq!(valid_types, vec!["Extract Method", "Rename Method"]);
                assert!(!json);
            }
            _ => panic!("expected compare"),
        }
        Ok(())
    }

    #[test]
    fn single_agent_flag_parses() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["refagent", "run", "demo", "--single-agent"])?;
        assert!(matches!(cli.command, Some(Commands::Run { single_agent: true, .. })));
        let cli = Cli::try_parse_from(["refagent", "run", "demo"])?;
        assert!(matches!(cli.command, Some(Commands::Run { single_agent: false, .. })));
        Ok(())
    }

    #[test]
    fn globals_follow_the_subcommand() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["refagent", "run", "demo", "--class", "Foo", "-v"])?;
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::Run { class: Some(ref c), .. }) if c == "Foo"
        ));
        Ok(())
    }
}
