//! Compile and test through an external build tool.

use std::path::Path;
use std::time::Duration;

use super::runner::run_command;
use crate::config::BuildConfig;
use crate::types::CommandResult;

/// The project build as seen by the refactoring loop.
pub trait BuildTool {
    /// Compiles the whole project.
    fn compile(&self, project: &Path) -> CommandResult;

    /// Runs one test class.
    fn run_test(&self, test_class: &str, project: &Path) -> CommandResult;
}

impl<T: BuildTool + ?Sized> BuildTool for &T {
    fn compile(&self, project: &Path) -> CommandResult {
        (**self).compile(project)
    }

    fn run_test(&self, test_class: &str, project: &Path) -> CommandResult {
        (**self).run_test(test_class, project)
    }
}

/// Command-line build tool, Maven by default.
#[derive(Debug, Clone)]
pub struct MavenTool {
    compile_command: String,
    test_command: String,
    timeout: Duration,
}

impl MavenTool {
    #[must_use]
    pub fn new(compile_command: &str, test_command: &str, timeout: Duration) -> Self {
        Self {
            compile_command: compile_command.to_string(),
            test_command: test_command.to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            &config.compile_command,
            &config.test_command,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl Default for MavenTool {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

impl BuildTool for MavenTool {
    fn compile(&self, project: &Path) -> CommandResult {
        run_command(project, &self.compile_command, &[], self.timeout)
    }

    fn run_test(&self, test_class: &str, project: &Path) -> CommandResult {
        run_command(
            project,
            &self.test_command,
            &[("class", test_class)],
            self.timeout,
        )
    }
}
