// tests/unit_mining.rs
use std::fs;

use anyhow::Result;
use refagent_core::mining::{
    compute_agreement, export_events, extract_events_from_dir, load_events, EventType,
    NO_REFACTORING, NO_REFACTORING_INVALID_JSON,
};

const DEVELOPER: &str = r#"{"commits": [{"refactorings": [
    {"type": "Extract Method",
     "leftSideLocations": [{"filePath": "src/Foo.java", "codeElement": "run()", "startLine": 10, "endLine": 40}],
     "rightSideLocations": [{"filePath": "src/Foo.java", "codeElement": "step()", "startLine": 41, "endLine": 50}]},
    {"type": "Rename Variable",
     "leftSideLocations": [{"filePath": "src/Bar.java", "codeElement": "x", "startLine": 3, "endLine": 3}],
     "rightSideLocations": []}
]}]}"#;

const ORACLE: &str = r#"{"commits": [{"refactorings": [
    {"type": "Extract Method",
     "leftSideLocations": [{"filePath": "src/Foo.java", "codeElement": "run()", "startLine": 12, "endLine": 38}],
     "rightSideLocations": []},
    {"type": "Inline Method",
     "leftSideLocations": [{"filePath": "src/Bar.java", "codeElement": "y()", "startLine": 7, "endLine": 9}],
     "rightSideLocations": []}
]}]}"#;

#[test]
fn sentinel_documents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("empty.json"), r#"{"commits": []}"#)?;
    fs::write(dir.path().join("garbled.json"), "{\"commits\": [")?;

    let events = extract_events_from_dir(dir.path())?;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind.label(), NO_REFACTORING);
    assert!(events[0].file.ends_with("empty.json"));
    assert_eq!(events[1].kind.label(), NO_REFACTORING_INVALID_JSON);
    assert!(events.iter().all(|e| e.start_line.is_none()));
    Ok(())
}

#[test]
fn extract_export_and_compare() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dev_dir = dir.path().join("dev");
    let llm_dir = dir.path().join("llm");
    fs::create_dir_all(&dev_dir)?;
    fs::create_dir_all(&llm_dir)?;
    fs::write(dev_dir.join("Foo.json"), DEVELOPER)?;
    fs::write(llm_dir.join("Foo.json"), ORACLE)?;

    let dev_out = dir.path().join("out/dev_events.json");
    let llm_out = dir.path().join("out/llm_events.json");
    export_events(&extract_events_from_dir(&dev_dir)?, &dev_out)?;
    export_events(&extract_events_from_dir(&llm_dir)?, &llm_out)?;

    let developer = load_events(&dev_out)?;
    let oracle = load_events(&llm_out)?;
    assert_eq!(developer.len(), 3);
    assert_eq!(developer[2].kind, EventType::Refactoring("Rename Variable".into()));

    let agreement = compute_agreement(&oracle, &developer, None);
    assert_eq!(agreement.overlaps, 1);
    assert_eq!(agreement.oracle_files, 2);
    // Rename Variable is not an oracle type, so only Foo.java counts.
    assert_eq!(agreement.developer_files, 1);
    assert!((agreement.precision - 0.5).abs() < 1e-9);
    assert!((agreement.recall - 1.0).abs() < 1e-9);
    assert_eq!(agreement.details[0].file, "src/Foo.java");
    Ok(())
}

#[test]
fn exported_events_use_the_mining_field_names() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("Foo.json"), DEVELOPER)?;
    let out = dir.path().join("events.json");
    export_events(&extract_events_from_dir(dir.path())?, &out)?;

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    let first = &raw[0];
    assert_eq!(first["type"], "Extract Method");
    assert_eq!(first["codeElement"], "run()");
    assert_eq!(first["startLine"], 10);
    assert_eq!(first["endLine"], 40);
    Ok(())
}
