// src/cli/handlers.rs
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::exit::RefAgentExit;
use crate::graph::{DependencyAnalyzer, ExportOutcome};
use crate::metrics::{DesigniteCalculator, MetricsSource};
use crate::mining;
use crate::oracle::OpenAiOracle;
use crate::pipeline::{Pipeline, ProjectLayout, RunSummary};
use crate::refactor::{LoopSettings, RefactoringLoop};
use crate::vcs::{GitCommitter, NoCommit, VersionControl};
use crate::verification::MavenTool;

const SINGLE_AGENT_DIR: &str = "single_agent";

/// Handles the run command. The single-agent baseline writes its results
/// under `<results>/single_agent`.
///
/// # Errors
/// Returns error if the oracle cannot be set up or the project not read.
pub fn handle_run(
    config: &Config,
    project: &Path,
    class: Option<&str>,
    single_agent: bool,
) -> Result<RefAgentExit> {
    if !project.is_dir() {
        eprintln!("{} project directory not found: {}", "error:".red(), project.display());
        return Ok(RefAgentExit::InvalidInput);
    }
    let config = &run_config(config, single_agent);
    let settings = &config.settings;
    let oracle = OpenAiOracle::from_config(&settings.oracle, config.api_key())
        .context("Cannot reach the refactoring oracle")?;
    let git = GitCommitter::from_config(&settings.git);
    let vcs: &dyn VersionControl = if settings.git.enabled { &git } else { &NoCommit };

    let engine = RefactoringLoop::new(
        oracle,
        MavenTool::from_config(&settings.build),
        DesigniteCalculator::from_config(&settings.metrics),
        vcs,
        LoopSettings::from(&settings.refactor),
    );
    let summary = Pipeline::new(config, engine).run(project, class)?;
    print_summary(&summary);

    if let Some(class) = class.filter(|_| summary.total() == 0) {
        eprintln!("{} no refactorable class named {class}", "error:".red());
        return Ok(RefAgentExit::InvalidInput);
    }
    if summary.failed > 0 {
        return Ok(RefAgentExit::ClassFailures);
    }
    Ok(RefAgentExit::Success)
}

fn run_config(config: &Config, single_agent: bool) -> Config {
    let mut config = config.clone();
    let refactor = &mut config.settings.refactor;
    refactor.single_agent |= single_agent;
    if refactor.single_agent {
        let paths = &mut config.settings.paths;
        paths.results = Path::new(&paths.results)
            .join(SINGLE_AGENT_DIR)
            .to_string_lossy()
            .into_owned();
    }
    config
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "Run finished".bold());
    println!("  processed: {}", summary.processed);
    println!("  improved:  {}", summary.improved.to_string().green());
    println!("  failed:    {}", colour_count(summary.failed));
    println!("  skipped:   {}", summary.skipped.to_string().dimmed());
}

fn colour_count(n: usize) -> colored::ColoredString {
    if n == 0 {
        n.to_string().normal()
    } else {
        n.to_string().red()
    }
}

/// Handles the graph command.
///
/// # Errors
/// Returns error if the project cannot be scanned or the graph written.
pub fn handle_graph(config: &Config, project: &Path, class: &str) -> Result<RefAgentExit> {
    if !project.is_dir() {
        eprintln!("{} project directory not found: {}", "error:".red(), project.display());
        return Ok(RefAgentExit::InvalidInput);
    }
    let layout = ProjectLayout::new(config, project)?;
    let mut analyzer = DependencyAnalyzer::new(class);
    analyzer.analyze_project(project)?;

    match analyzer.export_to_json(&layout.graph_file(class))? {
        ExportOutcome::Written { path, nodes, edges } => {
            println!(
                "{} {} ({nodes} nodes, {edges} edges)",
                "[OK]".green().bold(),
                path.display()
            );
            Ok(RefAgentExit::Success)
        }
        ExportOutcome::NoDependents => {
            println!("{} {class} not found in {}", "[SKIP]".yellow(), project.display());
            Ok(RefAgentExit::NoDependents)
        }
    }
}

/// Handles the metrics command.
///
/// # Errors
/// Never; tool failures map to an exit code.
pub fn handle_metrics(config: &Config, file: &Path) -> Result<RefAgentExit> {
    if !file.is_file() {
        eprintln!("{} source file not found: {}", "error:".red(), file.display());
        return Ok(RefAgentExit::InvalidInput);
    }
    let calculator = DesigniteCalculator::from_config(&config.settings.metrics);
    match calculator.compute_metrics(file) {
        Ok(report) => {
            print!("{}", report.render());
            Ok(RefAgentExit::Success)
        }
        Err(e) => {
            eprintln!("{} {e}", "metrics unavailable:".red());
            Ok(RefAgentExit::MetricsUnavailable)
        }
    }
}

/// Handles the events command.
///
/// # Errors
/// Returns error if the directory cannot be read or the output written.
pub fn handle_events(dir: &Path, output: &Path) -> Result<RefAgentExit> {
    if !dir.is_dir() {
        eprintln!("{} mining directory not found: {}", "error:".red(), dir.display());
        return Ok(RefAgentExit::InvalidInput);
    }
    let events = mining::extract_events_from_dir(dir)?;
    mining::export_events(&events, output)?;
    let sentinels = events.iter().filter(|e| e.is_sentinel()).count();
    println!(
        "{} {} events ({sentinels} without refactorings) -> {}",
        "[OK]".green().bold(),
        events.len(),
        output.display()
    );
    Ok(RefAgentExit::Success)
}

/// Handles the compare command.
///
/// # Errors
/// Returns error if an event file cannot be read.
pub fn handle_compare(
    oracle: &Path,
    developer: &Path,
    valid_types: &[String],
    json: bool,
) -> Result<RefAgentExit> {
    let oracle_events = mining::load_events(oracle)?;
    let developer_events = mining::load_events(developer)?;
    let valid = (!valid_types.is_empty()).then_some(valid_types);
    let agreement = mining::compute_agreement(&oracle_events, &developer_events, valid);

    if json {
        println!("{}", serde_json::to_string_pretty(&agreement)?);
        return Ok(RefAgentExit::Success);
    }
    println!("{}", "Agreement".bold());
    println!("  overlaps:  {}", agreement.overlaps);
    println!("  precision: {:.3} ({} oracle files)", agreement.precision, agreement.oracle_files);
    println!("  recall:    {:.3} ({} developer files)", agreement.recall, agreement.developer_files);
    println!("  f1:        {:.3}", agreement.f1);
    for o in &agreement.details {
        println!(
            "  {} {} oracle {}-{} within developer {}-{}",
            o.file.dimmed(),
            o.refactoring_type.cyan(),
            o.oracle_start_line,
            o.oracle_end_line,
            o.developer_start_line,
            o.developer_end_line
        );
    }
    Ok(RefAgentExit::Success)
}

/// Handles the init command.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn handle_init(config: &Config, path: &Path, force: bool) -> Result<RefAgentExit> {
    if path.exists() && !force {
        eprintln!("{} {} exists (use --force)", "error:".red(), path.display());
        return Ok(RefAgentExit::InvalidInput);
    }
    config.save(path)?;
    println!("{} wrote {}", "[OK]".green().bold(), path.display());
    Ok(RefAgentExit::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_agent_results_go_to_their_own_directory() {
        let mut config = Config::new();
        config.settings.paths.results = "out".into();

        let multi = run_config(&config, false);
        assert!(!multi.settings.refactor.single_agent);
        assert_eq!(multi.settings.paths.results, "out");

        let single = run_config(&config, true);
        assert!(single.settings.refactor.single_agent);
        assert_eq!(Path::new(&single.settings.paths.results), Path::new("out/single_agent"));

        config.settings.refactor.single_agent = true;
        assert!(run_config(&config, false).settings.refactor.single_agent);
    }
}
