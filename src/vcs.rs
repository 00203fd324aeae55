// src/vcs.rs
//! Committing accepted candidates.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::config::GitConfig;
use crate::types::CommandResult;
use crate::verification::run_command;

/// Where accepted working-file states are recorded.
pub trait VersionControl {
    /// Commits `file` (relative to `repo`) and publishes it.
    ///
    /// # Errors
    /// Returns error if any step fails; the loop logs and continues.
    fn commit_file(&self, repo: &Path, file: &Path) -> Result<()>;
}

impl<T: VersionControl + ?Sized> VersionControl for &T {
    fn commit_file(&self, repo: &Path, file: &Path) -> Result<()> {
        (**self).commit_file(repo, file)
    }
}

/// Used when `[git] enabled = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommit;

impl VersionControl for NoCommit {
    fn commit_file(&self, _repo: &Path, file: &Path) -> Result<()> {
        tracing::debug!(file = %file.display(), "git disabled, skipping commit");
        Ok(())
    }
}

/// The `git` command line: add, commit, push `HEAD` to `branch` on `remote`.
/// Without that remote the commit stays local.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    remote: String,
    branch: String,
    message_template: String,
    timeout: Duration,
}

impl GitCommitter {
    #[must_use]
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            message_template: config.commit_message.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    #[must_use]
    pub fn message_for(&self, file: &Path) -> String {
        self.message_template
            .replace("{file}", &file.to_string_lossy().replace('\\', "/"))
    }

    fn git(&self, repo: &Path, template: &str, vars: &[(&str, &str)]) -> CommandResult {
        run_command(repo, template, vars, self.timeout)
    }
}

impl VersionControl for GitCommitter {
    fn commit_file(&self, repo: &Path, file: &Path) -> Result<()> {
        let file_arg = file.to_string_lossy();
        let file_vars = [("file", file_arg.as_ref())];

        let added = self.git(repo, "git add -- {file}", &file_vars);
        if !added.passed() {
            bail!("git add failed: {}", added.stderr().trim());
        }

        // Exit 0 means nothing staged for this file.
        if self
            .git(repo, "git diff --cached --quiet -- {file}", &file_vars)
            .passed()
        {
            tracing::info!(file = %file.display(), "no changes to commit");
            return Ok(());
        }

        let message = self.message_for(file);
        let committed = self.git(
            repo,
            "git commit -m {message} -- {file}",
            &[("message", message.as_str()), ("file", file_arg.as_ref())],
        );
        if !committed.passed() {
            bail!("git commit failed: {}", committed.output().trim());
        }

        let remote_vars = [("remote", self.remote.as_str())];
        if !self.git(repo, "git remote get-url {remote}", &remote_vars).passed() {
            tracing::warn!(remote = %self.remote, "no remote configured, commit kept locally");
            return Ok(());
        }

        let refspec = format!("HEAD:refs/heads/{}", self.branch);
        let pushed = self.git(
            repo,
            "git push {remote} {refspec}",
            &[("remote", self.remote.as_str()), ("refspec", refspec.as_str())],
        );
        if !pushed.passed() {
            bail!("git push failed: {}", pushed.stderr().trim());
        }

        tracing::info!(file = %file.display(), branch = %self.branch, "committed and pushed");
        Ok(())
    }
}
