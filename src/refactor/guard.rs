// src/refactor/guard.rs
//! Snapshot-and-restore guard for the file under refactoring.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Holds the original content of a working file and puts it back when
/// dropped, so every exit path (including unwinding) ends pristine.
#[derive(Debug)]
pub struct WorkingFileGuard {
    path: PathBuf,
    original: String,
}

impl WorkingFileGuard {
    /// # Errors
    /// Returns error if the file cannot be read.
    pub fn snapshot(path: &Path) -> io::Result<Self> {
        let original = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            original,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// # Errors
    /// Returns error if the write fails.
    pub fn write_candidate(&self, content: &str) -> io::Result<()> {
        fs::write(&self.path, content)
    }

    /// True when the file on disk equals the snapshot.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        fs::read_to_string(&self.path).is_ok_and(|current| current == self.original)
    }

    /// Writes the snapshot back if the file differs.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn restore(&self) -> io::Result<()> {
        if self.is_pristine() {
            return Ok(());
        }
        fs::write(&self.path, &self.original)?;
        tracing::debug!(path = %self.path.display(), "working file restored");
        Ok(())
    }

    /// Restores a file that should already be pristine, warning when it
    /// was not.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn ensure_pristine(&self) -> io::Result<()> {
        if !self.is_pristine() {
            tracing::warn!(path = %self.path.display(), "working file changed outside an attempt, restoring");
            fs::write(&self.path, &self.original)?;
        }
        Ok(())
    }
}

impl Drop for WorkingFileGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!(path = %self.path.display(), error = %e, "failed to restore working file");
        }
    }
}
