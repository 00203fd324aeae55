//! Machine-readable run journal.
//!
//! Events are appended to `<results>/events.jsonl`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const JOURNAL_FILE: &str = "events.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RunStarted {
        project: String,
        files: usize,
    },
    ClassStarted {
        class: String,
    },
    ClassSkipped {
        class: String,
        reason: String,
    },
    AttemptFinished {
        class: String,
        iteration: usize,
        compiled: bool,
        tests_passed: bool,
        improved: bool,
    },
    RolledBack {
        class: String,
        iteration: usize,
    },
    CommitFailed {
        class: String,
        error: String,
    },
    ResultWritten {
        class: String,
        path: String,
    },
    ClassFailed {
        class: String,
        error: String,
    },
    RunFinished {
        processed: usize,
        improved: usize,
        failed: usize,
        skipped: usize,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunEvent {
    pub timestamp: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub struct EventLogger {
    log_path: Option<PathBuf>,
}

impl EventLogger {
    #[must_use]
    pub fn new(results_dir: &Path) -> Self {
        Self {
            log_path: Some(results_dir.join(JOURNAL_FILE)),
        }
    }

    /// A logger that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self { log_path: None }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn log(&self, kind: EventKind) {
        let Some(path) = &self.log_path else {
            return;
        };
        // Best-effort: a journal failure never stops a run.
        if let Err(e) = Self::serialize_event(kind).and_then(|json| append_line(path, &json)) {
            tracing::debug!(error = %e, "could not append to run journal");
        }
    }

    fn serialize_event(kind: EventKind) -> Result<String> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let event = RunEvent { timestamp, kind };
        Ok(serde_json::to_string(&event)?)
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Reads a journal back, skipping lines that do not parse.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn read_journal(path: &Path) -> Result<Vec<RunEvent>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_append_as_json_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = EventLogger::new(&dir.path().join("results"));
        logger.log(EventKind::ClassStarted {
            class: "Foo".into(),
        });
        logger.log(EventKind::RolledBack {
            class: "Foo".into(),
            iteration: 1,
        });

        let path = logger.path().expect("enabled");
        let raw = fs::read_to_string(path)?;
        assert!(raw.lines().next().is_some_and(|l| l.contains("\"class_started\"")));

        let events = read_journal(path)?;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1].kind,
            EventKind::RolledBack {
                class: "Foo".into(),
                iteration: 1
            }
        );
        Ok(())
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let logger = EventLogger::disabled();
        logger.log(EventKind::ClassStarted {
            class: "Foo".into(),
        });
        assert!(logger.path().is_none());
    }
}
