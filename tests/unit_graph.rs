// tests/unit_graph.rs
//! Dependency graphs built from small Java projects on disk.

use std::fs;
use std::path::Path;

use anyhow::Result;
use refagent_core::graph::{DependencyAnalyzer, DependencyGraph, ExportOutcome, GraphDocument};
use refagent_core::refactor::TestScope;

fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn foo_bar_baz(root: &Path) -> Result<()> {
    write(root, "src/main/java/a/Foo.java", "package a;\npublic class Foo { public void run() {} }\n")?;
    write(
        root,
        "src/main/java/b/Bar.java",
        "package b;\nimport a.Foo;\npublic class Bar { }\n",
    )?;
    write(
        root,
        "src/main/java/c/Baz.java",
        "package c;\nimport a.Foo;\npublic class Baz extends Foo { }\n",
    )?;
    write(
        root,
        "src/main/java/d/Unrelated.java",
        "package d;\npublic class Unrelated { }\n",
    )?;
    Ok(())
}

#[test]
fn importers_and_subclasses_are_dependents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    foo_bar_baz(dir.path())?;

    let mut analyzer = DependencyAnalyzer::new("Foo");
    analyzer.analyze_project(dir.path())?;
    let pruned = analyzer.prune().ok_or_else(|| anyhow::anyhow!("Foo missing"))?;

    let mut nodes = pruned.nodes();
    nodes.sort_unstable();
    assert_eq!(nodes, vec!["Bar", "Baz", "Foo"]);
    assert_eq!(pruned.edge_count(), 2);
    assert!(pruned.has_edge("Bar", "Foo"));
    assert!(pruned.has_edge("Baz", "Foo"));
    assert!(!pruned.contains("Unrelated"));
    assert_eq!(analyzer.files_scanned(), 4);
    Ok(())
}

#[test]
fn unreferenced_class_is_a_singleton() -> Result<()> {
    let dir = tempfile::tempdir()?;
    foo_bar_baz(dir.path())?;

    let mut analyzer = DependencyAnalyzer::new("Unrelated");
    analyzer.analyze_project(dir.path())?;
    let out = dir.path().join("graphs/Unrelated_dependency_graph.json");
    let outcome = analyzer.export_to_json(&out)?;

    assert!(matches!(outcome, ExportOutcome::Written { nodes: 1, edges: 0, .. }));
    let doc = GraphDocument::load(&out)?;
    assert_eq!(doc.node_ids(), vec!["Unrelated"]);
    assert!(doc.links.is_empty());
    Ok(())
}

#[test]
fn unknown_focus_has_no_dependents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    foo_bar_baz(dir.path())?;

    let mut analyzer = DependencyAnalyzer::new("Missing");
    analyzer.analyze_project(dir.path())?;
    let out = dir.path().join("graphs/Missing_dependency_graph.json");

    assert_eq!(analyzer.export_to_json(&out)?, ExportOutcome::NoDependents);
    assert!(!out.exists());
    Ok(())
}

#[test]
fn transitive_dependents_and_their_tests() -> Result<()> {
    let dir = tempfile::tempdir()?;
    foo_bar_baz(dir.path())?;
    write(
        dir.path(),
        "src/test/java/b/BarTest.java",
        "package b;\nimport junit.framework.TestCase;\npublic class BarTest extends TestCase {\n    public void testIt() { Bar bar = new Bar(); }\n}\n",
    )?;

    let mut analyzer = DependencyAnalyzer::new("Foo");
    analyzer.analyze_project(dir.path())?;
    let out = dir.path().join("graphs/Foo_dependency_graph.json");
    analyzer.export_to_json(&out)?;

    let scope = TestScope::from_export(&out)?;
    assert_eq!(scope.tests(), ["BarTest"]);

    let reloaded = DependencyGraph::from_document(&GraphDocument::load(&out)?);
    assert!(reloaded.has_edge("BarTest", "Bar"));
    assert!(!reloaded.contains("TestCase"));
    Ok(())
}

#[test]
fn broken_files_do_not_stop_the_scan() -> Result<()> {
    let dir = tempfile::tempdir()?;
    foo_bar_baz(dir.path())?;
    write(dir.path(), "src/main/java/e/Broken.java", "public class Broken { void x( }")?;

    let mut analyzer = DependencyAnalyzer::new("Foo");
    analyzer.analyze_project(dir.path())?;
    assert!(!analyzer.graph().contains("Broken"));
    assert!(analyzer.prune().is_some_and(|g| g.node_count() == 3));
    Ok(())
}
