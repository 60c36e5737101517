//! LLM client factory functions for CLI commands.
//!
//! Provides builders for creating LLM clients from configuration.

use std::sync::Arc;

use crate::config::{LlmConfig, LlmProviderKind};
use crate::llm::{
    AnthropicClient, GeminiClient, LlmHttpConfig, LlmProvider, LlmResilienceConfig, OllamaClient,
    OpenAiClient, ResilientLlmProvider,
};

/// Builds HTTP configuration from LLM config with environment overrides.
#[must_use]
pub fn build_http_config(llm_config: &LlmConfig) -> LlmHttpConfig {
    LlmHttpConfig::from_config(llm_config).with_env_overrides()
}

/// Builds resilience configuration from LLM config with environment overrides.
#[must_use]
pub fn build_resilience_config(llm_config: &LlmConfig) -> LlmResilienceConfig {
    LlmResilienceConfig::from_config(llm_config).with_env_overrides()
}

/// Builds a Gemini client from configuration.
#[must_use]
pub fn build_gemini_client(llm_config: &LlmConfig) -> GeminiClient {
    let mut client = GeminiClient::from_http_config(build_http_config(llm_config));
    if let Some(ref api_key) = llm_config.api_key {
        client = client.with_api_key(api_key);
    }
    if let Some(ref model) = llm_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    if let Some(max_tokens) = llm_config.max_tokens {
        client = client.with_max_tokens(max_tokens);
    }
    client
}

/// Builds an `OpenAI` client from configuration.
#[must_use]
pub fn build_openai_client(llm_config: &LlmConfig) -> OpenAiClient {
    let mut client = OpenAiClient::from_http_config(build_http_config(llm_config));
    if let Some(ref api_key) = llm_config.api_key {
        client = client.with_api_key(api_key);
    }
    if let Some(ref model) = llm_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    if let Some(max_tokens) = llm_config.max_tokens {
        client = client.with_max_tokens(max_tokens);
    }
    client
}

/// Builds an Anthropic client from configuration.
#[must_use]
pub fn build_anthropic_client(llm_config: &LlmConfig) -> AnthropicClient {
    let mut client = AnthropicClient::from_http_config(build_http_config(llm_config));
    if let Some(ref api_key) = llm_config.api_key {
        client = client.with_api_key(api_key);
    }
    if let Some(ref model) = llm_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    if let Some(max_tokens) = llm_config.max_tokens {
        client = client.with_max_tokens(max_tokens);
    }
    client
}

/// Builds an Ollama client from configuration.
#[must_use]
pub fn build_ollama_client(llm_config: &LlmConfig) -> OllamaClient {
    let mut client = OllamaClient::from_http_config(build_http_config(llm_config));
    if let Some(ref model) = llm_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = llm_config.base_url {
        client = client.with_endpoint(base_url);
    }
    client
}

/// Builds the configured provider wrapped with retries and a circuit breaker.
#[must_use]
pub fn build_llm_provider(llm_config: &LlmConfig) -> Arc<dyn LlmProvider> {
    let resilience_config = build_resilience_config(llm_config);
    tracing::debug!(provider = %llm_config.provider, "Building LLM provider");

    match llm_config.provider {
        LlmProviderKind::Gemini => Arc::new(ResilientLlmProvider::new(
            build_gemini_client(llm_config),
            resilience_config,
        )),
        LlmProviderKind::OpenAi => Arc::new(ResilientLlmProvider::new(
            build_openai_client(llm_config),
            resilience_config,
        )),
        LlmProviderKind::Anthropic => Arc::new(ResilientLlmProvider::new(
            build_anthropic_client(llm_config),
            resilience_config,
        )),
        LlmProviderKind::Ollama => Arc::new(ResilientLlmProvider::new(
            build_ollama_client(llm_config),
            resilience_config,
        )),
    }
}
