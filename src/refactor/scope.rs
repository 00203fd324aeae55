//! Which tests guard a refactoring.

use std::path::Path;

use crate::error::Result;
use crate::graph::{DependencyGraph, GraphDocument};

/// Test classes to run after each candidate compiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestScope {
    tests: Vec<String>,
}

impl TestScope {
    #[must_use]
    pub fn new(tests: Vec<String>) -> Self {
        Self { tests }
    }

    /// Every test class among the focus and its dependents.
    #[must_use]
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        Self::new(graph.test_classes())
    }

    /// # Errors
    /// Returns error if the exported graph cannot be read.
    pub fn from_export(path: &Path) -> Result<Self> {
        Ok(Self::new(GraphDocument::load(path)?.test_classes()))
    }

    #[must_use]
    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::ReferenceKind;

    #[test]
    fn scope_comes_from_the_pruned_graph() -> Result<()> {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("FooTest", "Foo", ReferenceKind::MethodCall);
        graph.add_dependency("FooTest", "TestCase", ReferenceKind::Extends);
        graph.add_dependency("BarTest", "Bar", ReferenceKind::MethodCall);
        let pruned = graph.prune("Foo").expect("focus present");
        assert_eq!(TestScope::from_graph(&pruned).tests(), ["FooTest"]);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Foo_dependency_graph.json");
        pruned.to_document().save(&path)?;
        assert_eq!(TestScope::from_export(&path)?, TestScope::from_graph(&pruned));
        Ok(())
    }
}
