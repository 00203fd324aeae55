//! Flattening refactoring-mining documents into events.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RefAgentError, Result};

pub const NO_REFACTORING: &str = "No Refactoring";
pub const NO_REFACTORING_INVALID_JSON: &str = "No Refactoring (Invalid JSON)";
const UNKNOWN: &str = "Unknown";

/// A refactoring type label, or one of the two sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Refactoring(String),
    NoRefactoring,
    InvalidJson,
}

impl EventType {
    /// Sentinels stand in for files without usable refactorings.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Refactoring(_))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Refactoring(label) => label,
            Self::NoRefactoring => NO_REFACTORING,
            Self::InvalidJson => NO_REFACTORING_INVALID_JSON,
        }
    }
}

impl From<String> for EventType {
    fn from(label: String) -> Self {
        match label.as_str() {
            NO_REFACTORING => Self::NoRefactoring,
            NO_REFACTORING_INVALID_JSON => Self::InvalidJson,
            _ => Self::Refactoring(label),
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        kind.label().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One location touched by one refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringEvent {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(rename = "codeElement")]
    pub code_element: Option<String>,
    #[serde(rename = "startLine")]
    pub start_line: Option<u32>,
    #[serde(rename = "endLine")]
    pub end_line: Option<u32>,
}

impl RefactoringEvent {
    fn sentinel(source: &str, kind: EventType) -> Self {
        Self {
            file: source.to_string(),
            kind,
            code_element: None,
            start_line: None,
            end_line: None,
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }
}

#[derive(Deserialize)]
struct MiningDocument {
    #[serde(default)]
    commits: Vec<MinedCommit>,
}

#[derive(Deserialize)]
struct MinedCommit {
    #[serde(default)]
    refactorings: Vec<MinedRefactoring>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinedRefactoring {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    left_side_locations: Vec<MinedLocation>,
    #[serde(default)]
    right_side_locations: Vec<MinedLocation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinedLocation {
    file_path: Option<String>,
    code_element: Option<String>,
    start_line: Option<u32>,
    end_line: Option<u32>,
}

/// Events of one mining document. `source` names the document in the
/// sentinel events.
#[must_use]
pub fn extract_events(source: &str, text: &str) -> Vec<RefactoringEvent> {
    let doc: MiningDocument = match serde_json::from_str(text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(source, error = %e, "mining document is not valid JSON");
            return vec![RefactoringEvent::sentinel(source, EventType::InvalidJson)];
        }
    };

    let mut events = Vec::new();
    let mut seen_refactoring = false;
    for refactoring in doc.commits.iter().flat_map(|c| &c.refactorings) {
        seen_refactoring = true;
        let kind = EventType::from(
            refactoring
                .kind
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        );
        for loc in refactoring
            .left_side_locations
            .iter()
            .chain(&refactoring.right_side_locations)
        {
            events.push(RefactoringEvent {
                file: loc.file_path.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                kind: kind.clone(),
                code_element: loc.code_element.clone(),
                start_line: loc.start_line,
                end_line: loc.end_line,
            });
        }
    }

    if !seen_refactoring {
        events.push(RefactoringEvent::sentinel(source, EventType::NoRefactoring));
    }
    events
}

/// # Errors
/// Returns error if the file cannot be read.
pub fn extract_events_from_file(path: &Path) -> Result<Vec<RefactoringEvent>> {
    let text = fs::read_to_string(path).map_err(|e| RefAgentError::io(e, path))?;
    Ok(extract_events(&path.to_string_lossy(), &text))
}

/// Events of every `*.json` file directly inside `dir`, in file-name order.
///
/// # Errors
/// Returns error if the directory or one of its files cannot be read.
pub fn extract_events_from_dir(dir: &Path) -> Result<Vec<RefactoringEvent>> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .map_err(|e| RefAgentError::io(e, dir))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort();

    let mut events = Vec::new();
    for file in files {
        events.extend(extract_events_from_file(&file)?);
    }
    tracing::info!(dir = %dir.display(), events = events.len(), "mining events extracted");
    Ok(events)
}

/// # Errors
/// Returns error on any filesystem failure.
pub fn export_events(events: &[RefactoringEvent], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RefAgentError::io(e, parent))?;
    }
    let json = serde_json::to_string_pretty(events).map_err(|source| RefAgentError::Json {
        source,
        path: path.to_path_buf(),
    })?;
    fs::write(path, json).map_err(|e| RefAgentError::io(e, path))
}

/// # Errors
/// Returns error if the file is unreadable or not an event list.
pub fn load_events(path: &Path) -> Result<Vec<RefactoringEvent>> {
    let raw = fs::read_to_string(path).map_err(|e| RefAgentError::io(e, path))?;
    serde_json::from_str(&raw).map_err(|source| RefAgentError::Json {
        source,
        path: path.to_path_buf(),
    })
}
