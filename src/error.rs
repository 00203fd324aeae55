// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefAgentError {
    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RefAgentError>;

impl RefAgentError {
    /// Wraps an I/O error with the path it concerned.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

// Allow `?` on std::io::Error by converting to RefAgentError::Io with unknown path.
impl From<std::io::Error> for RefAgentError {
    fn from(source: std::io::Error) -> Self {
        RefAgentError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
