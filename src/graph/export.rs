// src/graph/export.rs
//! Persisted node/link form of a dependency graph.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::select_tests;
use crate::error::{RefAgentError, Result};
use crate::java::ReferenceKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub source: String,
    pub target: String,
    /// Reference kinds behind this edge; absent in documents written by
    /// tools that only record reachability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<ReferenceKind>,
}

/// `{ "directed": true, "nodes": [{"id"}], "links": [{"source", "target"}] }`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_directed")]
    pub directed: bool,
    pub nodes: Vec<NodeEntry>,
    pub links: Vec<LinkEntry>,
}

fn default_directed() -> bool {
    true
}

impl GraphDocument {
    /// Reads a persisted graph.
    ///
    /// # Errors
    /// Returns error if the file is unreadable or not a graph document.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| RefAgentError::io(e, path))?;
        serde_json::from_str(&raw).map_err(|source| RefAgentError::Json {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Writes the document as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error on any filesystem failure.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RefAgentError::io(e, parent))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| RefAgentError::Json {
            source,
            path: path.to_path_buf(),
        })?;
        fs::write(path, json).map_err(|e| RefAgentError::io(e, path))
    }

    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Test classes named by this document, see
    /// [`DependencyGraph::test_classes`](super::DependencyGraph::test_classes).
    #[must_use]
    pub fn test_classes(&self) -> Vec<String> {
        select_tests(self.node_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_node_link_documents() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let raw = r#"{
            "directed": true, "multigraph": false, "graph": {},
            "nodes": [{"id": "Foo"}, {"id": "FooTest"}, {"id": "TestCase"}],
            "links": [{"source": "FooTest", "target": "Foo"}]
        }"#;
        let doc: GraphDocument = serde_json::from_str(raw)?;
        assert_eq!(doc.node_ids(), vec!["Foo", "FooTest", "TestCase"]);
        assert!(doc.links[0].kinds.is_empty());
        assert_eq!(doc.test_classes(), vec!["FooTest"]);
        Ok(())
    }

    #[test]
    fn save_then_load() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("graphs/demo/Foo_dependency_graph.json");
        let doc = GraphDocument {
            directed: true,
            nodes: vec![NodeEntry { id: "Foo".into() }],
            links: Vec::new(),
        };
        doc.save(&path)?;
        assert_eq!(GraphDocument::load(&path)?, doc);
        Ok(())
    }

    #[test]
    fn load_reports_bad_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ nodes: ")?;
        assert!(matches!(GraphDocument::load(&path), Err(RefAgentError::Json { .. })));
        Ok(())
    }
}
