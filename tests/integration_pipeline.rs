// tests/integration_pipeline.rs
//! Batch runs over a small project with every external tool faked.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use anyhow::Result;
use refagent_core::config::Config;
use refagent_core::events::{read_journal, EventKind, JOURNAL_FILE};
use refagent_core::metrics::{MetricsError, MetricsReport, MetricsSource};
use refagent_core::oracle::{Oracle, OracleError};
use refagent_core::pipeline::{Pipeline, RunSummary};
use refagent_core::refactor::{ClassResult, LoopSettings, RefactoringLoop, RESULT_FILE};
use refagent_core::types::{CommandOutcome, CommandResult};
use refagent_core::vcs::NoCommit;
use refagent_core::verification::BuildTool;

/// Answers by request kind, so any number of classes can be driven.
struct AgreeableOracle;

impl Oracle for AgreeableOracle {
    fn ask(&self, _system: &str, user: &str) -> Result<String, OracleError> {
        let reply = if user.starts_with("For each method") {
            r#"{"run": "yes, simplify"}"#
        } else if user.starts_with("Following these instructions") {
            "```java\npublic class Foo { void run() {} }\n```"
        } else {
            "true"
        };
        Ok(reply.to_string())
    }
}

#[derive(Default)]
struct PassingBuild {
    tests: RefCell<Vec<String>>,
}

impl BuildTool for PassingBuild {
    fn compile(&self, _project: &Path) -> CommandResult {
        CommandResult::new("compile".into(), CommandOutcome::Success, String::new(), String::new(), 1)
    }

    fn run_test(&self, test_class: &str, _project: &Path) -> CommandResult {
        self.tests.borrow_mut().push(test_class.to_string());
        CommandResult::new("test".into(), CommandOutcome::Success, String::new(), String::new(), 1)
    }
}

struct StaticMetrics;

impl MetricsSource for StaticMetrics {
    fn compute_metrics(&self, _source_file: &Path) -> Result<MetricsReport, MetricsError> {
        Ok(MetricsReport::default())
    }
}

fn project(root: &Path) -> Result<()> {
    let main = root.join("demo/src/main/java/a");
    let test = root.join("demo/src/test/java/a");
    fs::create_dir_all(&main)?;
    fs::create_dir_all(&test)?;
    fs::write(main.join("Foo.java"), "package a;\npublic class Foo { void run() { for (;;) {} } }\n")?;
    fs::write(main.join("package-info.java"), "// no types here\npackage a;\n")?;
    fs::write(
        test.join("FooTest.java"),
        "package a;\npublic class FooTest { void testRun() { new Foo().run(); } }\n",
    )?;
    Ok(())
}

fn config(root: &Path) -> Config {
    let mut config = Config::new();
    let paths = &mut config.settings.paths;
    paths.data = root.join("data/paths").to_string_lossy().into_owned();
    paths.graphs = root.join("data/graphs").to_string_lossy().into_owned();
    paths.results = root.join("results").to_string_lossy().into_owned();
    config
}

#[test]
fn run_writes_every_artifact() -> Result<()> {
    let dir = tempfile::tempdir()?;
    project(dir.path())?;
    let config = config(dir.path());
    let build = PassingBuild::default();
    let engine = RefactoringLoop::new(
        AgreeableOracle,
        &build,
        StaticMetrics,
        NoCommit,
        LoopSettings::default(),
    );

    let summary = Pipeline::new(&config, engine).run(&dir.path().join("demo"), None)?;

    assert_eq!(
        summary,
        RunSummary {
            processed: 1,
            improved: 1,
            failed: 0,
            skipped: 1,
        }
    );
    assert_eq!(*build.tests.borrow(), vec!["FooTest".to_string()]);

    let files: Vec<String> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("data/paths/demo_files.json"))?)?;
    assert_eq!(files.len(), 3);
    assert!(dir.path().join("data/graphs/demo/Foo_dependency_graph.json").exists());

    let result = ClassResult::load(&dir.path().join("results/demo/Foo").join(RESULT_FILE))?;
    assert!(result.is_improved);
    assert_eq!(result.iterations(), 1);

    let original = fs::read_to_string(dir.path().join("demo/src/main/java/a/Foo.java"))?;
    assert!(original.contains("for (;;)"));

    let journal = read_journal(&dir.path().join("results").join(JOURNAL_FILE))?;
    assert!(matches!(journal.first().map(|e| &e.kind), Some(EventKind::RunStarted { files: 3, .. })));
    assert!(matches!(
        journal.last().map(|e| &e.kind),
        Some(EventKind::RunFinished { processed: 1, improved: 1, .. })
    ));
    Ok(())
}

#[test]
fn class_filter_restricts_the_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    project(dir.path())?;
    let config = config(dir.path());
    let engine = RefactoringLoop::new(
        AgreeableOracle,
        PassingBuild::default(),
        StaticMetrics,
        NoCommit,
        LoopSettings::default(),
    );
    let pipeline = Pipeline::new(&config, engine);

    let none = pipeline.run(&dir.path().join("demo"), Some("Nope"))?;
    assert_eq!(none.total(), 0);
    assert!(!dir.path().join("results/demo").exists());

    let one = pipeline.run(&dir.path().join("demo"), Some("Foo"))?;
    assert_eq!(one.processed, 1);
    assert_eq!(one.skipped, 0);
    Ok(())
}
