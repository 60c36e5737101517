//! Anthropic Claude client.

use super::{LlmHttpConfig, LlmProvider, build_http_client, classify_request_error};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Anthropic Claude LLM client.
pub struct AnthropicClient {
    /// API key.
    api_key: Option<String>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// Completion token limit.
    max_tokens: u32,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl AnthropicClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.anthropic.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";

    /// Default completion token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    /// Creates a new Anthropic client.
    #[must_use]
    pub fn new() -> Self {
        Self::from_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a new Anthropic client with the given HTTP timeouts.
    #[must_use]
    pub fn from_http_config(config: LlmHttpConfig) -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            client: build_http_client(config),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the completion token limit.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets HTTP client timeouts for LLM requests.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Validates that the client is configured with a plausible API key.
    fn validate(&self) -> Result<()> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "anthropic_request".to_string(),
                cause: "ANTHROPIC_API_KEY not set".to_string(),
            })?;

        if !Self::is_valid_api_key_format(key) {
            return Err(Error::OperationFailed {
                operation: "anthropic_request".to_string(),
                cause: "Invalid API key format: expected 'sk-ant-' prefix".to_string(),
            });
        }

        Ok(())
    }

    /// Checks if an API key has a valid format.
    ///
    /// Valid Anthropic keys start with `sk-ant-`, are at least 40 characters
    /// and contain only alphanumerics, hyphens and underscores.
    fn is_valid_api_key_format(key: &str) -> bool {
        const MIN_KEY_LENGTH: usize = 40;
        const PREFIX: &str = "sk-ant-";

        if !key.starts_with(PREFIX) || key.len() < MIN_KEY_LENGTH {
            return false;
        }

        key.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Makes a request to the Messages API.
    fn request(&self, system: Option<&str>, messages: Vec<Message>) -> Result<String> {
        self.validate()?;

        tracing::info!(provider = "anthropic", model = %self.model, "Making LLM request");

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "anthropic_request".to_string(),
                cause: "API key not configured".to_string(),
            })?;

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.map(str::to_string),
            messages,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.endpoint))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = classify_request_error(&e);
                tracing::error!(
                    provider = "anthropic",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "anthropic_request".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "anthropic",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "anthropic_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: MessagesResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "anthropic",
                model = %self.model,
                error = %e,
                "Failed to parse LLM response"
            );
            Error::OperationFailed {
                operation: "anthropic_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| Error::OperationFailed {
                operation: "anthropic_response".to_string(),
                cause: "No text content in response".to_string(),
            })
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(None, vec![Message::user(prompt)])
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(Some(system), vec![Message::user(user)])
    }
}

/// Request to the Messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

/// A message in the conversation.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Response from the Messages API.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// A content block in the response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}
