//! The class dependency graph and its pruning to an impact set.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef, Reversed};
use petgraph::Direction;

use super::export::{GraphDocument, LinkEntry, NodeEntry};
use crate::java::ReferenceKind;

/// Name that marks JUnit 3 base classes; never selected as a test to run.
pub const TEST_BASE_CLASS: &str = "TestCase";

/// Edge weight: every kind of reference seen between the same two classes.
pub type EdgeKinds = BTreeSet<ReferenceKind>;

/// Directed graph of `dependent -> dependency` edges between simple class
/// names.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, EdgeKinds>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `name`, creating it if needed.
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(name) {
            return ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), ix);
        ix
    }

    /// Records that `dependent` references `dependency`. Repeated edges
    /// merge their kinds; self references are ignored.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str, kind: ReferenceKind) {
        if dependent == dependency {
            return;
        }
        let from = self.ensure_node(dependent);
        let to = self.ensure_node(dependency);
        match self.graph.find_edge(from, to) {
            Some(e) => {
                if let Some(kinds) = self.graph.edge_weight_mut(e) {
                    kinds.insert(kind);
                }
            }
            None => {
                self.graph.add_edge(from, to, BTreeSet::from([kind]));
            }
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node names in insertion order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|ix| self.graph[ix].as_str())
            .collect()
    }

    /// `(dependent, dependency, kinds)` triples.
    #[must_use]
    pub fn edges(&self) -> Vec<(&str, &str, &EdgeKinds)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    e.weight(),
                )
            })
            .collect()
    }

    #[must_use]
    pub fn has_edge(&self, dependent: &str, dependency: &str) -> bool {
        match (self.index.get(dependent), self.index.get(dependency)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Classes that reference `name` directly.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let Some(&ix) = self.index.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(ix, Direction::Incoming)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.sort_unstable();
        out
    }

    /// The impact set of `focus`: the focus plus every class that reaches it
    /// through dependency edges, with all edges among those classes.
    ///
    /// Returns `None` when `focus` is not in the graph.
    #[must_use]
    pub fn prune(&self, focus: &str) -> Option<DependencyGraph> {
        let &start = self.index.get(focus)?;
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut keep = HashSet::new();
        while let Some(ix) = dfs.next(reversed) {
            keep.insert(ix);
        }

        let graph = self.graph.filter_map(
            |ix, name| keep.contains(&ix).then(|| name.clone()),
            |_, kinds| Some(kinds.clone()),
        );
        let index = graph
            .node_indices()
            .map(|ix| (graph[ix].clone(), ix))
            .collect();
        Some(DependencyGraph { graph, index })
    }

    /// Classes whose tests exercise this graph: names containing `Test`,
    /// except the JUnit base class.
    #[must_use]
    pub fn test_classes(&self) -> Vec<String> {
        select_tests(self.nodes())
    }

    #[must_use]
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            directed: true,
            nodes: self
                .nodes()
                .into_iter()
                .map(|id| NodeEntry { id: id.to_string() })
                .collect(),
            links: self
                .edges()
                .into_iter()
                .map(|(source, target, kinds)| LinkEntry {
                    source: source.to_string(),
                    target: target.to_string(),
                    kinds: kinds.iter().copied().collect(),
                })
                .collect(),
        }
    }

    /// Rebuilds a graph from a persisted document.
    #[must_use]
    pub fn from_document(doc: &GraphDocument) -> Self {
        let mut graph = Self::new();
        for node in &doc.nodes {
            graph.ensure_node(&node.id);
        }
        for link in &doc.links {
            if link.kinds.is_empty() && link.source != link.target {
                let a = graph.ensure_node(&link.source);
                let b = graph.ensure_node(&link.target);
                graph.graph.update_edge(a, b, EdgeKinds::new());
            }
            for kind in &link.kinds {
                graph.add_dependency(&link.source, &link.target, *kind);
            }
        }
        graph
    }
}

pub(crate) fn select_tests<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| n.contains("Test") && *n != TEST_BASE_CLASS)
        .map(str::to_string)
        .collect()
}
