//! Class dependency graph: project scan, pruning and persistence.

pub mod builder;
pub mod export;
pub mod model;

pub use builder::{DependencyAnalyzer, ExportOutcome};
pub use export::{GraphDocument, LinkEntry, NodeEntry};
pub use model::{DependencyGraph, EdgeKinds, TEST_BASE_CLASS};
