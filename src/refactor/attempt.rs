//! One iteration of the verify-and-retry loop.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsReport;

/// Where an attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    CompileFailed,
    TestsFailed,
    NotImproved,
    Improved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactoringAttempt {
    /// 1-based.
    pub iteration: usize,
    pub outcome: AttemptOutcome,
    /// The first test class that failed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_test: Option<String>,
    /// Build, test or judgment output explaining a rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip)]
    pub candidate: String,
    #[serde(skip)]
    pub after_metrics: Option<MetricsReport>,
}

impl RefactoringAttempt {
    #[must_use]
    pub fn compile_failed(iteration: usize, candidate: String, output: String) -> Self {
        Self {
            iteration,
            outcome: AttemptOutcome::CompileFailed,
            failed_test: None,
            failure: Some(output),
            candidate,
            after_metrics: None,
        }
    }

    #[must_use]
    pub fn tests_failed(iteration: usize, candidate: String, test: &str, output: String) -> Self {
        Self {
            iteration,
            outcome: AttemptOutcome::TestsFailed,
            failed_test: Some(test.to_string()),
            failure: Some(output),
            candidate,
            after_metrics: None,
        }
    }

    #[must_use]
    pub fn judged(
        iteration: usize,
        candidate: String,
        after_metrics: MetricsReport,
        improved: bool,
    ) -> Self {
        Self {
            iteration,
            outcome: if improved {
                AttemptOutcome::Improved
            } else {
                AttemptOutcome::NotImproved
            },
            failed_test: None,
            failure: (!improved).then(|| "the change was judged not to improve the class".to_string()),
            candidate,
            after_metrics: Some(after_metrics),
        }
    }

    /// A candidate accepted on build and tests alone, with no judgment.
    #[must_use]
    pub fn verified(iteration: usize, candidate: String) -> Self {
        Self {
            iteration,
            outcome: AttemptOutcome::Improved,
            failed_test: None,
            failure: None,
            candidate,
            after_metrics: None,
        }
    }

    #[must_use]
    pub fn compiled(&self) -> bool {
        self.outcome != AttemptOutcome::CompileFailed
    }

    #[must_use]
    pub fn tests_passed(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::NotImproved | AttemptOutcome::Improved)
    }

    #[must_use]
    pub fn improved(&self) -> bool {
        self.outcome == AttemptOutcome::Improved
    }

    /// `(compiled, tests passed, improved)`.
    #[must_use]
    pub fn triple(&self) -> (bool, bool, bool) {
        (self.compiled(), self.tests_passed(), self.improved())
    }
}
