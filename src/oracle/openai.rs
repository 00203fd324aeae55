//! Blocking client for OpenAI-compatible chat completions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Oracle, OracleError};
use crate::config::OracleConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiOracle {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiOracle {
    /// # Errors
    /// Returns error when no key is available or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &OracleConfig, api_key: Option<String>) -> Result<Self, OracleError> {
        let api_key = api_key.ok_or_else(|| OracleError::MissingApiKey(config.api_key_env.clone()))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Oracle for OpenAiOracle {
    fn ask(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, prompt_len = user_prompt.len(), "querying oracle");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<String, OracleError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| OracleError::InvalidResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| OracleError::InvalidResponse("no completion in reply".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_is_the_reply() -> Result<(), OracleError> {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  True \n"}}]}"#;
        assert_eq!(parse_reply(body)?, "True");
        Ok(())
    }

    #[test]
    fn empty_choices_are_invalid() {
        assert!(matches!(
            parse_reply(r#"{"choices": []}"#),
            Err(OracleError::InvalidResponse(_))
        ));
        assert!(matches!(parse_reply("<html>"), Err(OracleError::InvalidResponse(_))));
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = OpenAiOracle::from_config(&OracleConfig::default(), None).err();
        assert!(matches!(err, Some(OracleError::MissingApiKey(var)) if var == "OPENAI_API_KEY"));
    }

    #[test]
    fn endpoint_joins_base_url() -> Result<(), OracleError> {
        let config = OracleConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..OracleConfig::default()
        };
        let oracle = OpenAiOracle::from_config(&config, Some("k".into()))?;
        assert_eq!(oracle.endpoint(), "http://localhost:8080/v1/chat/completions");
        Ok(())
    }

    #[test]
    fn request_serializes_both_messages() -> Result<(), serde_json::Error> {
        let request = ChatRequest {
            model: "gpt-4",
            messages: [
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            max_tokens: 4096,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&request)?;
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 4096);
        Ok(())
    }
}
