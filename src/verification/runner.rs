//! Command execution and output capture.

use crate::types::{CommandOutcome, CommandResult};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Splits a command template and substitutes `{name}` placeholders in each
/// argument.
///
/// Uses POSIX shell-style quoting rules via `shell_words::split`; values are
/// substituted after splitting, so paths with spaces stay one argument.
///
/// # Errors
/// Returns the parse error message for unbalanced quotes.
pub fn expand_template(template: &str, vars: &[(&str, &str)]) -> Result<Vec<String>, String> {
    let parts = shell_words::split(template).map_err(|e| format!("Failed to parse command: {e}"))?;
    Ok(parts
        .into_iter()
        .map(|part| {
            vars.iter().fold(part, |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        })
        .collect())
}

/// Runs a command template in `cwd`, killing it once `timeout` elapses.
#[must_use]
pub fn run_command(
    cwd: &Path,
    template: &str,
    vars: &[(&str, &str)],
    timeout: Duration,
) -> CommandResult {
    let parts = match expand_template(template, vars) {
        Ok(p) => p,
        Err(e) => return CommandResult::spawn_failed(template, e),
    };
    let command_line = shell_words::join(&parts);
    let Some((program, args)) = parts.split_first() else {
        return CommandResult::spawn_failed(template, "Empty command");
    };

    tracing::debug!(command = %command_line, cwd = %cwd.display(), "running command");
    let start = Instant::now();
    let child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match child {
        Ok(c) => c,
        Err(e) => return CommandResult::spawn_failed(&command_line, e.to_string()),
    };

    let out_thread = child.stdout.take().map(spawn_stream_reader);
    let err_thread = child.stderr.take().map(spawn_stream_reader);

    let outcome = wait_with_timeout(&mut child, timeout);
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    // A killed build may leave grandchildren holding the pipes open.
    let (stdout, stderr) = if matches!(outcome, CommandOutcome::TimedOut { .. }) {
        (String::new(), String::new())
    } else {
        (join_reader(out_thread), join_reader(err_thread))
    };

    if !matches!(outcome, CommandOutcome::Success) {
        tracing::debug!(command = %command_line, outcome = %outcome.label(), "command failed");
    }
    CommandResult::new(command_line, outcome, stdout, stderr, duration_ms)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> CommandOutcome {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return match status.code() {
                    Some(0) => CommandOutcome::Success,
                    Some(code) => CommandOutcome::NonZeroExit { code },
                    None => CommandOutcome::NonZeroExit { code: -1 },
                };
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return CommandOutcome::TimedOut {
                    after_secs: timeout.as_secs(),
                };
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return CommandOutcome::SpawnFailed {
                    reason: e.to_string(),
                };
            }
        }
    }
}

fn spawn_stream_reader<R: Read + Send + 'static>(mut input: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = input.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
