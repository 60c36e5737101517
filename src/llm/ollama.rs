//! Ollama (local) client.

use super::{LlmHttpConfig, LlmProvider, build_http_client, classify_request_error};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ollama local LLM client.
pub struct OllamaClient {
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama3.2";

    /// Creates a new Ollama client.
    ///
    /// Honors `OLLAMA_HOST` and `OLLAMA_MODEL`.
    #[must_use]
    pub fn new() -> Self {
        Self::from_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a new Ollama client with the given HTTP timeouts.
    #[must_use]
    pub fn from_http_config(config: LlmHttpConfig) -> Self {
        let endpoint =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        let model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Self {
            endpoint,
            model,
            client: build_http_client(config),
        }
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

    /// Sets HTTP client timeouts for LLM requests.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Checks if the Ollama server answers.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn build_request(&self, system: Option<&str>, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            format: "json",
            stream: false,
        }
    }

    /// Makes a request to the Generate API.
    fn request(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        tracing::info!(provider = "ollama", model = %self.model, "Making LLM request");

        let request = self.build_request(system, prompt);

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = classify_request_error(&e);
                tracing::error!(
                    provider = "ollama",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "ollama_request".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "ollama_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: GenerateResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                error = %e,
                "Failed to parse LLM response"
            );
            Error::OperationFailed {
                operation: "ollama_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        Ok(response.response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(None, prompt)
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(Some(system), user)
    }
}

/// Request to the Generate API.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    format: &'static str,
    stream: bool,
}

/// Response from the Generate API.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
