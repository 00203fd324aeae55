// src/graph/builder.rs
//! Project scan that turns parsed Java units into dependency edges.

use std::fs;
use std::path::{Path, PathBuf};

use super::export::GraphDocument;
use super::model::DependencyGraph;
use crate::discovery;
use crate::error::Result;
use crate::java::{self, CompilationUnit, ReferenceKind};

/// Result of [`DependencyAnalyzer::export_to_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written {
        path: PathBuf,
        nodes: usize,
        edges: usize,
    },
    /// The focus class was never seen, so nothing was written.
    NoDependents,
}

/// Builds the dependency graph of a project around one focus class.
#[derive(Debug, Clone)]
pub struct DependencyAnalyzer {
    focus: String,
    graph: DependencyGraph,
    files_scanned: usize,
}

impl DependencyAnalyzer {
    #[must_use]
    pub fn new(focus: &str) -> Self {
        Self {
            focus: focus.to_string(),
            graph: DependencyGraph::new(),
            files_scanned: 0,
        }
    }

    #[must_use]
    pub fn focus(&self) -> &str {
        &self.focus
    }

    /// The unpruned graph accumulated so far.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    #[must_use]
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Adds the declarations and references of one source file.
    ///
    /// Unparseable files contribute nothing.
    pub fn analyze_source(&mut self, path: &Path, content: &str) {
        let unit = java::extract(path, content);
        self.add_unit(&unit);
        self.files_scanned += 1;
    }

    /// Adds an already extracted unit.
    pub fn add_unit(&mut self, unit: &CompilationUnit) {
        for class in &unit.classes {
            self.graph.ensure_node(&class.name);
        }

        if let Some(primary) = unit.primary_class() {
            for name in unit.imported_names() {
                self.graph
                    .add_dependency(&primary.name, name, ReferenceKind::Import);
            }
        }

        for class in &unit.classes {
            for (name, kind) in class.outgoing() {
                if is_plain_identifier(&name) {
                    self.graph.add_dependency(&class.name, &name, kind);
                }
            }
        }
    }

    /// Scans every `.java` file under `root`.
    ///
    /// # Errors
    /// Never fails on individual files: unreadable files are logged and
    /// skipped. The `Result` covers future walk-level failures.
    pub fn analyze_project(&mut self, root: &Path) -> Result<()> {
        let files = discovery::java_files(root);
        tracing::debug!(root = %root.display(), files = files.len(), focus = %self.focus, "scanning project");
        for path in files {
            match fs::read_to_string(&path) {
                Ok(content) => self.analyze_source(&path, &content),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                }
            }
        }
        Ok(())
    }

    /// Moves the focus without rescanning; batch runs scan a project once.
    pub fn refocus(&mut self, focus: &str) {
        focus.clone_into(&mut self.focus);
    }

    /// The focus plus everything that transitively depends on it.
    #[must_use]
    pub fn prune(&self) -> Option<DependencyGraph> {
        self.graph.prune(&self.focus)
    }

    /// Prunes and writes the graph as a node/link document.
    ///
    /// # Errors
    /// Returns error if the document cannot be written.
    pub fn export_to_json(&self, path: &Path) -> Result<ExportOutcome> {
        let Some(pruned) = self.prune() else {
            tracing::info!(focus = %self.focus, "no dependents found, graph not exported");
            return Ok(ExportOutcome::NoDependents);
        };
        let doc: GraphDocument = pruned.to_document();
        doc.save(path)?;
        tracing::info!(
            focus = %self.focus,
            nodes = pruned.node_count(),
            edges = pruned.edge_count(),
            path = %path.display(),
            "dependency graph exported"
        );
        Ok(ExportOutcome::Written {
            path: path.to_path_buf(),
            nodes: pruned.node_count(),
            edges: pruned.edge_count(),
        })
    }
}

/// Receivers such as `this.items` or `getFoo()` never name a class.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers() {
        assert!(is_plain_identifier("Foo"));
        assert!(is_plain_identifier("$Gen_1"));
        assert!(!is_plain_identifier("this.items"));
        assert!(!is_plain_identifier("get()"));
        assert!(!is_plain_identifier("1abc"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn static_calls_and_creations_become_edges() {
        let mut analyzer = DependencyAnalyzer::new("Foo");
        analyzer.analyze_source(
            Path::new("Foo.java"),
            "class Foo { static int twice(int x) { return 2 * x; } }",
        );
        analyzer.analyze_source(
            Path::new("Bar.java"),
            "class Bar { int go() { return Foo.twice(2); } }",
        );
        analyzer.analyze_source(
            Path::new("Baz.java"),
            "class Baz { Object make() { return new Foo(); } }",
        );
        let pruned = analyzer.prune().expect("focus declared");
        assert!(pruned.has_edge("Bar", "Foo"));
        assert!(pruned.has_edge("Baz", "Foo"));
        assert_eq!(analyzer.files_scanned(), 3);
    }

    #[test]
    fn unknown_focus_is_not_exported() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut analyzer = DependencyAnalyzer::new("Ghost");
        analyzer.analyze_source(Path::new("Foo.java"), "class Foo {}");
        let out = dir.path().join("Ghost_dependency_graph.json");
        assert_eq!(analyzer.export_to_json(&out)?, ExportOutcome::NoDependents);
        assert!(!out.exists());
        Ok(())
    }
}
