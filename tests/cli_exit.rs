// tests/cli_exit.rs - Exit code tests against the built binary
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn refagent(cwd: &Path, args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_refagent"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
}

fn project() -> std::io::Result<TempDir> {
    let d = tempfile::tempdir()?;
    let src = d.path().join("demo/src/main/java");
    fs::create_dir_all(&src)?;
    fs::write(src.join("Foo.java"), "public class Foo {}")?;
    fs::write(src.join("Bar.java"), "public class Bar extends Foo {}")?;
    Ok(d)
}

#[test]
fn test_graph_exit_0_and_file_written() -> std::io::Result<()> {
    let d = project()?;
    let out = refagent(d.path(), &["graph", "demo", "Foo"])?;
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(d.path().join("data/graphs/demo/Foo_dependency_graph.json").exists());
    Ok(())
}

#[test]
fn test_graph_exit_3_unknown_class() -> std::io::Result<()> {
    let d = project()?;
    let out = refagent(d.path(), &["graph", "demo", "Missing"])?;
    assert_eq!(out.status.code(), Some(3));
    Ok(())
}

#[test]
fn test_exit_2_missing_project() -> std::io::Result<()> {
    let d = tempfile::tempdir()?;
    let out = refagent(d.path(), &["graph", "nowhere", "Foo"])?;
    assert_eq!(out.status.code(), Some(2));
    Ok(())
}

#[test]
fn test_exit_2_bad_config() -> std::io::Result<()> {
    let d = project()?;
    fs::write(d.path().join("refagent.toml"), "[refactor]\nmax_iterations = 0\n")?;
    let out = refagent(d.path(), &["graph", "demo", "Foo"])?;
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("max_iterations"));
    Ok(())
}

#[test]
fn test_events_then_compare_json() -> Result<(), Box<dyn std::error::Error>> {
    let d = tempfile::tempdir()?;
    fs::create_dir_all(d.path().join("mined"))?;
    fs::write(
        d.path().join("mined/Foo.json"),
        r#"{"commits": [{"refactorings": [{"type": "Extract Method",
            "leftSideLocations": [{"filePath": "Foo.java", "codeElement": "a()", "startLine": 1, "endLine": 9}],
            "rightSideLocations": []}]}]}"#,
    )?;
    let out = refagent(d.path(), &["events", "mined", "-o", "events.json"])?;
    assert_eq!(out.status.code(), Some(0));

    let out = refagent(
        d.path(),
        &["compare", "--oracle", "events.json", "--developer", "events.json", "--json"],
    )?;
    assert_eq!(out.status.code(), Some(0));
    let agreement: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(agreement["overlaps"], 1);
    assert_eq!(agreement["precision"], 1.0);
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> std::io::Result<()> {
    let d = tempfile::tempdir()?;
    assert_eq!(refagent(d.path(), &["init"])?.status.code(), Some(0));
    assert!(fs::read_to_string(d.path().join("refagent.toml"))?.contains("[refactor]"));
    assert_eq!(refagent(d.path(), &["init"])?.status.code(), Some(2));
    assert_eq!(refagent(d.path(), &["init", "--force"])?.status.code(), Some(0));
    Ok(())
}

#[test]
fn test_run_without_api_key_is_an_error() -> std::io::Result<()> {
    let d = project()?;
    fs::write(
        d.path().join("refagent.toml"),
        "[oracle]\napi_key_env = \"REFAGENT_CLI_TEST_NO_KEY\"\n",
    )?;
    let out = refagent(d.path(), &["run", "demo"])?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("REFAGENT_CLI_TEST_NO_KEY"));
    Ok(())
}
