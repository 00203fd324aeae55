//! The oracle operations used by the refactoring loop.

use super::prompts::{self, SINGLE_AGENT_SYSTEM_PROMPT, SYSTEM_PROMPT};
use super::response::{extract_code, parse_assessment, parse_decision, Assessment, Verdict};
use super::{Oracle, OracleError};
use crate::metrics::MetricsReport;

/// Wraps an [`Oracle`] with the refactoring-specific requests.
#[derive(Debug, Clone)]
pub struct RefactoringAdvisor<O> {
    oracle: O,
}

impl<O: Oracle> RefactoringAdvisor<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Per-method verdicts on whether `class_source` needs refactoring.
    ///
    /// # Errors
    /// Returns the transport error; unreadable replies are not errors.
    pub fn needs_refactoring(
        &self,
        class_source: &str,
        metrics: &MetricsReport,
    ) -> Result<Assessment, OracleError> {
        let reply = self.oracle.ask(
            SYSTEM_PROMPT,
            &prompts::needs_refactoring(class_source, &metrics.render()),
        )?;
        let assessment = parse_assessment(&reply);
        if assessment.is_malformed() {
            tracing::warn!("assessment reply had no readable method verdicts");
        }
        Ok(assessment)
    }

    /// The decision node: does at least one method need work.
    ///
    /// # Errors
    /// Returns the transport error.
    pub fn should_proceed(&self, assessment: &Assessment) -> Result<Verdict<()>, OracleError> {
        let reply = self
            .oracle
            .ask(SYSTEM_PROMPT, &prompts::should_proceed(&assessment.raw))?;
        Ok(parse_decision(&reply))
    }

    /// A candidate replacement for `class_source`, fences removed and
    /// ending in a newline.
    ///
    /// # Errors
    /// Returns the transport error.
    pub fn improve(
        &self,
        instructions: &str,
        metrics: &MetricsReport,
        class_source: &str,
        previous_failure: Option<&str>,
    ) -> Result<String, OracleError> {
        let reply = self.oracle.ask(
            SYSTEM_PROMPT,
            &prompts::improve(instructions, &metrics.render(), class_source, previous_failure),
        )?;
        Ok(extract_code(&reply))
    }

    /// The single-agent request: a refactored `class_source` with no
    /// assessment or metrics in the prompt.
    ///
    /// # Errors
    /// Returns the transport error.
    pub fn refactor_directly(&self, class_source: &str) -> Result<String, OracleError> {
        let reply = self.oracle.ask(
            SINGLE_AGENT_SYSTEM_PROMPT,
            &prompts::refactor_directly(class_source),
        )?;
        Ok(extract_code(&reply))
    }

    /// # Errors
    /// Returns the transport error.
    pub fn judge_improvement(
        &self,
        before: &str,
        before_metrics: &MetricsReport,
        after: &str,
        after_metrics: &MetricsReport,
    ) -> Result<Verdict<()>, OracleError> {
        let reply = self.oracle.ask(
            SYSTEM_PROMPT,
            &prompts::judge_improvement(
                before,
                &before_metrics.render(),
                after,
                &after_metrics.render(),
            ),
        )?;
        Ok(parse_decision(&reply))
    }
}
