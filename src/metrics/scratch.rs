//! Per-measurement scratch directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A fresh `input/` + `output/` pair for one tool run. Dropping it removes
/// everything; [`ScratchDir::clean`] does the same and reports failures.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// # Errors
    /// Returns error if the temporary directories cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("refagent-metrics-").tempdir()?;
        fs::create_dir(dir.path().join("input"))?;
        fs::create_dir(dir.path().join("output"))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    #[must_use]
    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// Copies `source` into the input directory under its own file name.
    ///
    /// # Errors
    /// Returns error if the path has no file name or the copy fails.
    pub fn stage(&self, source: &Path) -> io::Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "source has no file name")
        })?;
        let target = self.input().join(name);
        fs::copy(source, &target)?;
        Ok(target)
    }

    /// # Errors
    /// Returns error if removal fails.
    pub fn clean(self) -> io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_one_file_and_cleans_up() -> io::Result<()> {
        let src_dir = tempfile::tempdir()?;
        let source = src_dir.path().join("Foo.java");
        fs::write(&source, "class Foo {}")?;

        let scratch = ScratchDir::new()?;
        let staged = scratch.stage(&source)?;
        assert_eq!(fs::read_to_string(&staged)?, "class Foo {}");
        assert!(scratch.output().is_dir());

        let root = scratch.input();
        scratch.clean()?;
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn each_scratch_is_distinct() -> io::Result<()> {
        let a = ScratchDir::new()?;
        let b = ScratchDir::new()?;
        assert_ne!(a.input(), b.input());
        Ok(())
    }
}
