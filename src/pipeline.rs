// src/pipeline.rs
//! Batch driver: every non-test class of a project through the loop.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::discovery;
use crate::events::{EventKind, EventLogger};
use crate::graph::{DependencyAnalyzer, ExportOutcome};
use crate::java;
use crate::metrics::MetricsSource;
use crate::oracle::Oracle;
use crate::refactor::{ClassTarget, RefactoringLoop, TestScope, RESULT_FILE};
use crate::vcs::VersionControl;
use crate::verification::BuildTool;

/// Counts printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub improved: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed + self.skipped
    }
}

/// Output locations of one project, derived from `[paths]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub name: String,
    pub file_list: PathBuf,
    pub graphs: PathBuf,
    pub results: PathBuf,
}

impl ProjectLayout {
    /// # Errors
    /// Returns error if the project directory has no usable name.
    pub fn new(config: &Config, project: &Path) -> Result<Self> {
        let name = project_name(project)?;
        let paths = &config.settings.paths;
        Ok(Self {
            file_list: Path::new(&paths.data).join(format!("{name}_files.json")),
            graphs: Path::new(&paths.graphs).join(&name),
            results: Path::new(&paths.results).join(&name),
            name,
        })
    }

    #[must_use]
    pub fn graph_file(&self, class: &str) -> PathBuf {
        self.graphs.join(format!("{class}_dependency_graph.json"))
    }

    #[must_use]
    pub fn class_dir(&self, class: &str) -> PathBuf {
        self.results.join(class)
    }
}

fn project_name(project: &Path) -> Result<String> {
    let resolved = project
        .canonicalize()
        .with_context(|| format!("Project not found: {}", project.display()))?;
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot name project at {}", resolved.display()))
}

pub struct Pipeline<'a, O, B, M, V> {
    config: &'a Config,
    engine: RefactoringLoop<O, B, M, V>,
    journal: EventLogger,
}

impl<'a, O, B, M, V> Pipeline<'a, O, B, M, V>
where
    O: Oracle,
    B: BuildTool,
    M: MetricsSource,
    V: VersionControl,
{
    #[must_use]
    pub fn new(config: &'a Config, engine: RefactoringLoop<O, B, M, V>) -> Self {
        let journal = EventLogger::new(Path::new(&config.settings.paths.results));
        Self {
            config,
            engine: engine.with_journal(journal.clone()),
            journal,
        }
    }

    /// Runs every refactoring target of `project`, or only `only_class`.
    ///
    /// # Errors
    /// Returns error if the project cannot be read or the file list written.
    /// Per-class failures are counted, not returned.
    pub fn run(&self, project: &Path, only_class: Option<&str>) -> Result<RunSummary> {
        let layout = ProjectLayout::new(self.config, project)?;
        let files = discovery::java_files(project);
        discovery::export_file_list(&files, &layout.file_list)?;
        self.journal.log(EventKind::RunStarted {
            project: layout.name.clone(),
            files: files.len(),
        });

        let relative: Vec<PathBuf> = files
            .iter()
            .filter_map(|f| f.strip_prefix(project).ok().map(Path::to_path_buf))
            .collect();
        let targets = discovery::refactoring_targets(relative, &self.config.exclude_patterns);
        tracing::info!(project = %layout.name, files = files.len(), targets = targets.len(), "run started");

        let mut analyzer = DependencyAnalyzer::new("");
        analyzer.analyze_project(project)?;

        let mut summary = RunSummary::default();
        for file in targets {
            let Some(class) = java::primary_class_name(&project.join(&file)) else {
                if only_class.is_none() {
                    self.skip(&mut summary, &file.to_string_lossy(), "no class declaration");
                }
                continue;
            };
            if only_class.is_some_and(|c| c != class) {
                continue;
            }
            self.process(&mut analyzer, &layout, project, file, &class, &mut summary);
        }

        self.journal.log(EventKind::RunFinished {
            processed: summary.processed,
            improved: summary.improved,
            failed: summary.failed,
            skipped: summary.skipped,
        });
        tracing::info!(?summary, "run finished");
        Ok(summary)
    }

    fn process(
        &self,
        analyzer: &mut DependencyAnalyzer,
        layout: &ProjectLayout,
        project: &Path,
        file: PathBuf,
        class: &str,
        summary: &mut RunSummary,
    ) {
        analyzer.refocus(class);
        let graph_file = layout.graph_file(class);
        match analyzer.export_to_json(&graph_file) {
            Ok(ExportOutcome::Written { .. }) => {}
            Ok(ExportOutcome::NoDependents) => {
                self.skip(summary, class, "no dependency graph");
                return;
            }
            Err(e) => {
                self.skip(summary, class, &format!("graph export failed: {e}"));
                return;
            }
        }
        let scope = analyzer
            .prune()
            .map_or_else(TestScope::default, |g| TestScope::from_graph(&g));

        let class_dir = layout.class_dir(class);
        let target = ClassTarget {
            class: class.to_string(),
            project: project.to_path_buf(),
            file,
            scope,
            artifacts: Some(class_dir.clone()),
        };

        summary.processed += 1;
        let result = match self.engine.run(&target) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(class, error = %format!("{e:#}"), "class failed");
                self.journal.log(EventKind::ClassFailed {
                    class: class.to_string(),
                    error: format!("{e:#}"),
                });
                summary.failed += 1;
                return;
            }
        };

        if result.failed() {
            summary.failed += 1;
        } else if result.is_improved {
            summary.improved += 1;
        }

        let path = class_dir.join(RESULT_FILE);
        match result.save(&path) {
            Ok(()) => self.journal.log(EventKind::ResultWritten {
                class: class.to_string(),
                path: path.to_string_lossy().into_owned(),
            }),
            Err(e) => tracing::error!(class, error = %e, "could not write result"),
        }
    }

    fn skip(&self, summary: &mut RunSummary, class: &str, reason: &str) {
        tracing::info!(class, reason, "skipped");
        self.journal.log(EventKind::ClassSkipped {
            class: class.to_string(),
            reason: reason.to_string(),
        });
        summary.skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;

    #[test]
    fn layout_follows_paths_section() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let project = dir.path().join("demo");
        std::fs::create_dir_all(&project)?;
        let mut config = Config::new();
        config.settings.paths = PathsConfig {
            data: "d".into(),
            graphs: "g".into(),
            results: "r".into(),
            exclude: Vec::new(),
        };
        let layout = ProjectLayout::new(&config, &project)?;
        assert_eq!(layout.name, "demo");
        assert_eq!(layout.file_list, PathBuf::from("d/demo_files.json"));
        assert_eq!(layout.graph_file("Foo"), PathBuf::from("g/demo/Foo_dependency_graph.json"));
        assert_eq!(layout.class_dir("Foo").join(RESULT_FILE), PathBuf::from("r/demo/Foo/metrics.json"));
        Ok(())
    }

    #[test]
    fn missing_project_is_an_error() {
        let config = Config::new();
        assert!(ProjectLayout::new(&config, Path::new("/no/such/project")).is_err());
    }
}
