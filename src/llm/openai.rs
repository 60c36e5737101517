//! `OpenAI` client.

use super::{LlmHttpConfig, LlmProvider, build_http_client, classify_request_error};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// `OpenAI` LLM client.
///
/// Works with any Chat Completions compatible endpoint (LM Studio, vLLM, ...)
/// through [`OpenAiClient::with_endpoint`].
pub struct OpenAiClient {
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

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Default completion token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    /// Creates a new `OpenAI` client.
    #[must_use]
    pub fn new() -> Self {
        Self::from_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a new `OpenAI` client with the given HTTP timeouts.
    #[must_use]
    pub fn from_http_config(config: LlmHttpConfig) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok();
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

    /// Validates that the client is configured.
    fn validate(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: "OPENAI_API_KEY not set".to_string(),
            });
        }
        Ok(())
    }

    /// Checks if the model is a reasoning-family model.
    ///
    /// These models use `max_completion_tokens` instead of `max_tokens`
    /// and only support the default temperature.
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("gpt-5")
            || self.model.starts_with("o1")
            || self.model.starts_with("o3")
            || self.model.starts_with("o4")
    }

    fn build_request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        if self.is_reasoning_model() {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
                response_format: Some(ResponseFormat::json_object()),
            }
        } else {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: Some(0.0),
                response_format: Some(ResponseFormat::json_object()),
            }
        }
    }

    /// Makes a request to the Chat Completions API.
    fn request(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.validate()?;

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: "API key not configured".to_string(),
            })?;

        tracing::info!(provider = "openai", model = %self.model, "Making LLM request");

        let request = self.build_request(messages);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = classify_request_error(&e);
                tracing::error!(
                    provider = "openai",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "openai_request".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "openai",
                model = %self.model,
                status = %status,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: e.to_string(),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: "No choices in response".to_string(),
            })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(vec![ChatMessage::user(prompt)])
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Structured output mode.
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

impl ResponseFormat {
    const fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

/// A message in the chat.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new();
        assert_eq!(client.name(), "openai");
        assert_eq!(client.model, OpenAiClient::DEFAULT_MODEL);
        assert_eq!(client.max_tokens, OpenAiClient::DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_client_configuration() {
        let client = OpenAiClient::new()
            .with_api_key("test-key")
            .with_endpoint("https://custom.endpoint")
            .with_model("gpt-4")
            .with_max_tokens(256);

        assert_eq!(client.api_key, Some("test-key".to_string()));
        assert_eq!(client.endpoint, "https://custom.endpoint");
        assert_eq!(client.model, "gpt-4");
        assert_eq!(client.max_tokens, 256);
    }

    #[test]
    fn test_validate_no_key() {
        let client = OpenAiClient {
            api_key: None,
            endpoint: OpenAiClient::DEFAULT_ENDPOINT.to_string(),
            model: OpenAiClient::DEFAULT_MODEL.to_string(),
            max_tokens: OpenAiClient::DEFAULT_MAX_TOKENS,
            client: reqwest::blocking::Client::new(),
        };

        let err = client.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY not set"));
    }

    #[test]
    fn test_validate_with_key() {
        let client = OpenAiClient::new().with_api_key("test-key");
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_reasoning_model_detection() {
        for model in ["gpt-5", "gpt-5-mini", "o1-preview", "o3-mini", "o4-mini"] {
            assert!(OpenAiClient::new().with_model(model).is_reasoning_model());
        }
        for model in ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"] {
            assert!(!OpenAiClient::new().with_model(model).is_reasoning_model());
        }
    }

    #[test]
    fn test_request_shape_for_chat_model() {
        let client = OpenAiClient::new().with_model("gpt-4o-mini");
        let request = client.build_request(vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("max_completion_tokens").is_none());
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_shape_for_reasoning_model() {
        let client = OpenAiClient::new().with_model("o3-mini");
        let request = client.build_request(vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_completion_tokens"], 1024);
    }
}
