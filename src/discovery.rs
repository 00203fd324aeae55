// src/discovery.rs
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into during a project walk.
pub const PRUNE_DIRS: &[&str] = &[
    ".git", ".idea", ".gradle", ".mvn", "target", "build", "out", "node_modules",
];

#[must_use]
pub fn should_prune(name: &str) -> bool {
    PRUNE_DIRS.contains(&name)
}

/// Collects every `.java` file under `root`, sorted, skipping build output.
#[must_use]
pub fn java_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_prune(&e.file_name().to_string_lossy()));

    let (paths, error_count) = accumulate_walker(walker);
    if error_count > 0 {
        tracing::warn!(root = %root.display(), errors = error_count, "errors during file walk");
    }
    paths
}

fn accumulate_walker<I>(walker: I) -> (Vec<PathBuf>, usize)
where
    I: Iterator<Item = walkdir::Result<walkdir::DirEntry>>,
{
    let mut paths = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) => {
                let is_java = entry.path().extension().is_some_and(|e| e == "java");
                if entry.file_type().is_file() && is_java {
                    paths.push(entry.into_path());
                }
            }
            Err(_) => errors += 1,
        }
    }
    (paths, errors)
}

/// Test sources are recognised by path: anything containing "test",
/// case-insensitively (`src/test/java`, `FooTest.java`, `testutil/`).
#[must_use]
pub fn is_test_path(path: &Path) -> bool {
    normalize_path(path).to_lowercase().contains("test")
}

/// Drops test sources and anything matching an exclude pattern.
#[must_use]
pub fn refactoring_targets(paths: Vec<PathBuf>, exclude: &[Regex]) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|p| !is_test_path(p))
        .filter(|p| {
            let s = normalize_path(p);
            !exclude.iter().any(|re| re.is_match(&s))
        })
        .collect()
}

/// Writes the discovered file list as a JSON array.
///
/// # Errors
/// Returns error if the directory cannot be created or the file written.
pub fn export_file_list(files: &[PathBuf], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let list: Vec<String> = files.iter().map(|p| normalize_path(p)).collect();
    let json = serde_json::to_string_pretty(&list)?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Normalizes a path to use forward slashes (cross-platform pattern matching).
fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
