//! Google Gemini client.

use super::{LlmHttpConfig, LlmProvider, build_http_client, classify_request_error};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Google Gemini LLM client (Generative Language API).
pub struct GeminiClient {
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

impl GeminiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    /// Default completion token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    /// Creates a new Gemini client.
    ///
    /// Reads the key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    #[must_use]
    pub fn new() -> Self {
        Self::from_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a new Gemini client with the given HTTP timeouts.
    #[must_use]
    pub fn from_http_config(config: LlmHttpConfig) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok();
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

    /// Sets the model. A leading `models/` prefix is accepted.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model.strip_prefix("models/").unwrap_or(&model).to_string();
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

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: "GEMINI_API_KEY not set".to_string(),
            })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(&self, system: Option<&str>, user: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: system.map(Content::system),
            contents: vec![Content::user(user)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                max_output_tokens: self.max_tokens,
                temperature: 0.0,
            },
        }
    }

    /// Makes a request to the `generateContent` endpoint.
    fn request(&self, system: Option<&str>, user: &str) -> Result<String> {
        let api_key = self.api_key()?;

        tracing::info!(provider = "gemini", model = %self.model, "Making LLM request");

        let request = self.build_request(system, user);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = classify_request_error(&e);
                tracing::error!(
                    provider = "gemini",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "gemini_request".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "gemini",
                model = %self.model,
                status = %status,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: GenerateContentResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: e.to_string(),
            })?;

        response.into_text()
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(None, prompt)
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(Some(system), user)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: block_reason.map_or_else(
                    || "No candidates in response".to_string(),
                    |reason| format!("Prompt blocked: {reason}"),
                ),
            });
        };

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: format!(
                    "Empty candidate (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(text)
    }
}
