//! Result of an external command execution.

use serde::Serialize;

/// How a subprocess ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    Success,
    NonZeroExit { code: i32 },
    TimedOut { after_secs: u64 },
    SpawnFailed { reason: String },
}

impl CommandOutcome {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Success => "success".to_string(),
            Self::NonZeroExit { code } => format!("exit code {code}"),
            Self::TimedOut { after_secs } => format!("timed out after {after_secs}s"),
            Self::SpawnFailed { reason } => format!("failed to start: {reason}"),
        }
    }
}

/// Result of an external command execution.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// The command that was executed (display form).
    command: String,
    outcome: CommandOutcome,
    stdout: String,
    stderr: String,
    /// Execution time in milliseconds.
    duration_ms: u64,
}

impl CommandResult {
    #[must_use]
    pub fn new(
        command: String,
        outcome: CommandOutcome,
        stdout: String,
        stderr: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            command,
            outcome,
            stdout,
            stderr,
            duration_ms,
        }
    }

    /// A result that never reached the process table.
    #[must_use]
    pub fn spawn_failed(command: &str, reason: impl Into<String>) -> Self {
        Self::new(
            command.to_string(),
            CommandOutcome::SpawnFailed {
                reason: reason.into(),
            },
            String::new(),
            String::new(),
            0,
        )
    }

    /// The command that was executed.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn outcome(&self) -> &CommandOutcome {
        &self.outcome
    }

    /// Whether the command succeeded (exit code 0).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == CommandOutcome::Success
    }

    /// Process exit code; -1 when the process never exited on its own.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            CommandOutcome::Success => 0,
            CommandOutcome::NonZeroExit { code } => code,
            _ => -1,
        }
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Combined stdout and stderr output.
    #[must_use]
    pub fn output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Count error lines in output.
    #[must_use]
    pub fn error_count(&self) -> usize {
        count_matching_lines(&self.output(), |lower| {
            lower.contains("error:") || lower.starts_with("[error]")
        })
    }

    /// One-paragraph failure description: the outcome plus the last
    /// `max_lines` lines of output.
    #[must_use]
    pub fn failure_summary(&self, max_lines: usize) -> String {
        let output = self.output();
        let lines: Vec<&str> = output.lines().collect();
        let tail = lines[lines.len().saturating_sub(max_lines)..].join("\n");
        if tail.is_empty() {
            format!("`{}`: {}", self.command, self.outcome.label())
        } else {
            format!("`{}`: {}\n{tail}", self.command, self.outcome.label())
        }
    }
}

/// Counts lines in `text` where `predicate` matches the lowercased line.
fn count_matching_lines(text: &str, predicate: impl Fn(&str) -> bool) -> usize {
    text.lines()
        .filter(|line| predicate(&line.to_lowercase()))
        .count()
}
