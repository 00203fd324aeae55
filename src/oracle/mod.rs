//! The language-model oracle: transport seam, prompts and reply parsing.

pub mod advisor;
pub mod openai;
pub mod prompts;
pub mod response;

use thiserror::Error;

pub use advisor::RefactoringAdvisor;
pub use openai::OpenAiOracle;
pub use response::{
    extract_code, parse_assessment, parse_decision, strip_code_fences, Assessment, Verdict,
};

/// Transport-level failures. Never folded into reply text.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no API key: environment variable {0} is unset")]
    MissingApiKey(String),

    #[error("oracle request failed: {0}")]
    Transport(String),

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle reply unreadable: {0}")]
    InvalidResponse(String),
}

/// A text-in, text-out completion service.
pub trait Oracle {
    /// # Errors
    /// Returns error when the service cannot be reached or answers with
    /// something other than a completion.
    fn ask(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError>;
}

impl<T: Oracle + ?Sized> Oracle for &T {
    fn ask(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        (**self).ask(system_prompt, user_prompt)
    }
}

impl<T: Oracle + ?Sized> Oracle for Box<T> {
    fn ask(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        (**self).ask(system_prompt, user_prompt)
    }
}
