//! The per-class result artifact.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::attempt::RefactoringAttempt;
use crate::error::{RefAgentError, Result};
use crate::metrics::MetricsReport;

pub const RESULT_FILE: &str = "metrics.json";
pub const ORIGINAL_CODE_FILE: &str = "original_java_code.java";
pub const IMPROVED_CODE_FILE: &str = "improved_java_code.java";

/// Exactly one of these is persisted per class per run. The three flags
/// mirror the last attempt made.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassResult {
    #[serde(rename = "Compilation")]
    pub compilation: bool,
    #[serde(rename = "Test passed")]
    pub test_passed: bool,
    #[serde(rename = "is improved")]
    pub is_improved: bool,
    #[serde(rename = "CKO metrics", default, skip_serializing_if = "Option::is_none")]
    pub before_metrics: Option<MetricsReport>,
    #[serde(rename = "CKO metrics After", default, skip_serializing_if = "Option::is_none")]
    pub after_metrics: Option<MetricsReport>,
    #[serde(rename = "Instruction", default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(rename = "Attempts", default)]
    pub attempts: Vec<RefactoringAttempt>,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassResult {
    /// Folds one finished attempt into the record.
    pub fn record(&mut self, attempt: RefactoringAttempt) {
        let (compiled, tested, improved) = attempt.triple();
        self.compilation = compiled;
        self.test_passed = tested;
        self.is_improved = improved;
        if improved {
            self.after_metrics.clone_from(&attempt.after_metrics);
        }
        self.attempts.push(attempt);
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.attempts.len()
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// # Errors
    /// Returns error on any filesystem failure.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RefAgentError::io(e, parent))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| RefAgentError::Json {
            source,
            path: path.to_path_buf(),
        })?;
        fs::write(path, json).map_err(|e| RefAgentError::io(e, path))
    }

    /// # Errors
    /// Returns error if the file is unreadable or not a result record.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| RefAgentError::io(e, path))?;
        serde_json::from_str(&raw).map_err(|source| RefAgentError::Json {
            source,
            path: path.to_path_buf(),
        })
    }
}
