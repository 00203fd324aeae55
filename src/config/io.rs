// src/config/io.rs
use std::fs;
use std::path::Path;

use regex::Regex;

use super::types::RefAgentToml;
use crate::error::{RefAgentError, Result};

pub const CONFIG_FILE: &str = "refagent.toml";

/// Reads `path` if it exists. A missing file yields `None`.
///
/// # Errors
/// Returns error if the file exists but cannot be read.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RefAgentError::io(e, path)),
    }
}

/// # Errors
/// Returns error on malformed TOML or wrongly typed keys.
pub fn parse_toml(content: &str) -> Result<RefAgentToml> {
    toml::from_str(content).map_err(|e| RefAgentError::Config(e.to_string()))
}

/// # Errors
/// Returns error naming the first pattern that fails to compile.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| RefAgentError::Config(format!("bad exclude pattern '{p}': {e}")))
        })
        .collect()
}

/// Writes the given settings as TOML.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn save_to_file(toml_config: &RefAgentToml, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(toml_config).map_err(|e| RefAgentError::Config(e.to_string()))?;
    fs::write(path, content).map_err(|e| RefAgentError::io(e, path))
}
