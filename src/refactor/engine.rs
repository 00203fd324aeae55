// src/refactor/engine.rs
//! The bounded verify-and-retry refactoring loop.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::attempt::RefactoringAttempt;
use super::guard::WorkingFileGuard;
use super::result::{ClassResult, IMPROVED_CODE_FILE, ORIGINAL_CODE_FILE};
use super::scope::TestScope;
use crate::config::RefactorConfig;
use crate::events::{EventKind, EventLogger};
use crate::metrics::{MetricsReport, MetricsSource};
use crate::oracle::{Oracle, RefactoringAdvisor, Verdict};
use crate::vcs::VersionControl;
use crate::verification::BuildTool;

/// Knobs of one loop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub max_iterations: usize,
    pub feed_back_failures: bool,
    pub accept_malformed_judgment: bool,
    /// One direct refactor request, accepted on build and tests alone.
    pub single_agent: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from(&RefactorConfig::default())
    }
}

impl From<&RefactorConfig> for LoopSettings {
    fn from(config: &RefactorConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            feed_back_failures: config.feed_back_failures,
            accept_malformed_judgment: config.accept_malformed_judgment,
            single_agent: config.single_agent,
        }
    }
}

/// The class being refactored.
#[derive(Debug, Clone)]
pub struct ClassTarget {
    pub class: String,
    /// Root of the build; compile and test run here.
    pub project: PathBuf,
    /// Source file relative to `project`.
    pub file: PathBuf,
    pub scope: TestScope,
    /// Where the original and latest candidate sources are copied.
    pub artifacts: Option<PathBuf>,
}

impl ClassTarget {
    #[must_use]
    pub fn working_file(&self) -> PathBuf {
        self.project.join(&self.file)
    }
}

pub struct RefactoringLoop<O, B, M, V> {
    advisor: RefactoringAdvisor<O>,
    build: B,
    metrics: M,
    vcs: V,
    settings: LoopSettings,
    journal: EventLogger,
}

impl<O, B, M, V> RefactoringLoop<O, B, M, V>
where
    O: Oracle,
    B: BuildTool,
    M: MetricsSource,
    V: VersionControl,
{
    pub fn new(oracle: O, build: B, metrics: M, vcs: V, settings: LoopSettings) -> Self {
        Self {
            advisor: RefactoringAdvisor::new(oracle),
            build,
            metrics,
            vcs,
            settings,
            journal: EventLogger::disabled(),
        }
    }

    #[must_use]
    pub fn with_journal(mut self, journal: EventLogger) -> Self {
        self.journal = journal;
        self
    }

    /// Runs the loop for one class and returns its result record.
    ///
    /// Failures inside the loop are recorded in [`ClassResult::error`]; the
    /// working file is back to its original content whenever this returns.
    ///
    /// # Errors
    /// Returns error only if the working file cannot be read or restored.
    pub fn run(&self, target: &ClassTarget) -> Result<ClassResult> {
        let path = target.working_file();
        let guard = WorkingFileGuard::snapshot(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.journal.log(EventKind::ClassStarted {
            class: target.class.clone(),
        });
        tracing::info!(class = %target.class, tests = target.scope.tests().len(), "refactoring class");

        let mut result = ClassResult::default();
        let driven = if self.settings.single_agent {
            self.drive_single(target, &guard, &mut result)
        } else {
            self.drive(target, &guard, &mut result)
        };
        if let Err(e) = driven {
            tracing::warn!(class = %target.class, error = %format!("{e:#}"), "class aborted");
            self.journal.log(EventKind::ClassFailed {
                class: target.class.clone(),
                error: format!("{e:#}"),
            });
            result.error = Some(format!("{e:#}"));
        }

        guard
            .restore()
            .with_context(|| format!("Failed to restore {}", path.display()))?;
        Ok(result)
    }

    fn drive(
        &self,
        target: &ClassTarget,
        guard: &WorkingFileGuard,
        result: &mut ClassResult,
    ) -> Result<()> {
        let before = self
            .metrics
            .compute_metrics(guard.path())
            .context("metrics unavailable for the original source")?;
        result.before_metrics = Some(before.clone());

        let assessment = self
            .advisor
            .needs_refactoring(guard.original(), &before)
            .context("refactoring assessment failed")?;
        result.instruction = Some(assessment.raw.clone());

        let proceed = match self.advisor.should_proceed(&assessment)? {
            Verdict::Yes(()) => true,
            Verdict::No => false,
            Verdict::Malformed(reply) => {
                tracing::warn!(reply = %reply, "unreadable decision, using per-method verdicts");
                assessment.any_yes()
            }
        };
        if !proceed {
            tracing::info!(class = %target.class, "no method needs refactoring");
            return Ok(());
        }

        let mut feedback: Option<String> = None;
        for iteration in 1..=self.settings.max_iterations {
            guard.ensure_pristine()?;
            let candidate = self
                .advisor
                .improve(
                    &assessment.raw,
                    &before,
                    guard.original(),
                    feedback.as_deref().filter(|_| self.settings.feed_back_failures),
                )
                .with_context(|| format!("improve request failed on iteration {iteration}"))?;
            self.write_artifacts(target, guard.original(), &candidate);

            let attempt = self.attempt(iteration, target, guard, &before, candidate)?;
            self.settle(target, guard, &attempt)?;
            let improved = attempt.improved();
            if !improved {
                feedback.clone_from(&attempt.failure);
            }
            result.record(attempt);
            if improved {
                break;
            }
        }
        Ok(())
    }

    /// The single-agent baseline: one direct request, then build and tests.
    fn drive_single(
        &self,
        target: &ClassTarget,
        guard: &WorkingFileGuard,
        result: &mut ClassResult,
    ) -> Result<()> {
        let candidate = self
            .advisor
            .refactor_directly(guard.original())
            .context("direct refactor request failed")?;
        self.write_artifacts(target, guard.original(), &candidate);

        guard.write_candidate(&candidate)?;
        let attempt = self
            .verify(1, target, &candidate)
            .unwrap_or_else(|| RefactoringAttempt::verified(1, candidate));
        self.settle(target, guard, &attempt)?;
        result.record(attempt);
        Ok(())
    }

    /// Reports a finished attempt and rolls back a rejected candidate.
    fn settle(
        &self,
        target: &ClassTarget,
        guard: &WorkingFileGuard,
        attempt: &RefactoringAttempt,
    ) -> Result<()> {
        let iteration = attempt.iteration;
        let (compiled, tests_passed, improved) = attempt.triple();
        tracing::info!(class = %target.class, iteration, compiled, tests_passed, improved, "attempt finished");
        self.journal.log(EventKind::AttemptFinished {
            class: target.class.clone(),
            iteration,
            compiled,
            tests_passed,
            improved,
        });

        if !improved {
            guard.restore()?;
            self.journal.log(EventKind::RolledBack {
                class: target.class.clone(),
                iteration,
            });
        }
        Ok(())
    }

    /// Compiles the written candidate and runs the scoped tests in order.
    /// Returns the rejection, if any.
    fn verify(
        &self,
        iteration: usize,
        target: &ClassTarget,
        candidate: &str,
    ) -> Option<RefactoringAttempt> {
        let compile = self.build.compile(&target.project);
        if !compile.passed() {
            return Some(RefactoringAttempt::compile_failed(
                iteration,
                candidate.to_string(),
                compile.failure_summary(30),
            ));
        }

        target.scope.tests().iter().find_map(|test| {
            let run = self.build.run_test(test, &target.project);
            (!run.passed()).then(|| {
                RefactoringAttempt::tests_failed(
                    iteration,
                    candidate.to_string(),
                    test,
                    run.failure_summary(30),
                )
            })
        })
    }

    fn attempt(
        &self,
        iteration: usize,
        target: &ClassTarget,
        guard: &WorkingFileGuard,
        before: &MetricsReport,
        candidate: String,
    ) -> Result<RefactoringAttempt> {
        guard.write_candidate(&candidate)?;
        if let Some(rejected) = self.verify(iteration, target, &candidate) {
            return Ok(rejected);
        }

        if let Err(e) = self.vcs.commit_file(&target.project, &target.file) {
            tracing::warn!(class = %target.class, error = %format!("{e:#}"), "commit failed, continuing");
            self.journal.log(EventKind::CommitFailed {
                class: target.class.clone(),
                error: format!("{e:#}"),
            });
        }

        let after = self
            .metrics
            .compute_metrics(guard.path())
            .context("metrics unavailable for the candidate")?;
        let improved = match self
            .advisor
            .judge_improvement(guard.original(), before, &candidate, &after)?
        {
            Verdict::Yes(()) => true,
            Verdict::No => false,
            Verdict::Malformed(reply) => {
                tracing::warn!(reply = %reply, "unreadable judgment");
                self.settings.accept_malformed_judgment
            }
        };
        Ok(RefactoringAttempt::judged(iteration, candidate, after, improved))
    }

    fn write_artifacts(&self, target: &ClassTarget, original: &str, candidate: &str) {
        let Some(dir) = &target.artifacts else {
            return;
        };
        if let Err(e) = write_pair(dir, original, candidate) {
            tracing::warn!(dir = %dir.display(), error = %e, "could not write code artifacts");
        }
    }
}

fn write_pair(dir: &Path, original: &str, candidate: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(ORIGINAL_CODE_FILE), original)?;
    fs::write(dir.join(IMPROVED_CODE_FILE), candidate)
}
