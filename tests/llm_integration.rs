//! LLM client integration tests.
//!
//! Covers provider configuration, the retry and circuit breaker layer, and
//! error classification. No API keys or live services are needed: failures are
//! produced with mock providers and unroutable endpoints.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, dead_code)]

use duplitext::Error;
use duplitext::llm::{
    AnthropicClient, GeminiClient, LlmHttpConfig, LlmProvider, LlmResilienceConfig, OllamaClient,
    OpenAiClient, ResilientLlmProvider,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// An address nothing listens on.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn fast_http() -> LlmHttpConfig {
    LlmHttpConfig {
        timeout_ms: 2_000,
        connect_timeout_ms: 500,
    }
}

fn no_wait(max_retries: u32, threshold: u32) -> LlmResilienceConfig {
    LlmResilienceConfig {
        max_retries,
        retry_backoff_ms: 0,
        breaker_failure_threshold: threshold,
        breaker_reset_timeout_ms: 60_000,
        breaker_half_open_max_calls: 1,
    }
}

/// Provider that fails with a configurable error a set number of times.
struct FlakyProvider {
    calls: AtomicU32,
    failures: u32,
    cause: &'static str,
}

impl FlakyProvider {
    fn new(failures: u32, cause: &'static str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
            cause,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for FlakyProvider {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn complete(&self, _prompt: &str) -> duplitext::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(Error::OperationFailed {
                operation: "flaky_request".to_string(),
                cause: self.cause.to_string(),
            })
        } else {
            Ok(r#"{"user": [], "output": [], "time": [], "date": []}"#.to_string())
        }
    }
}

mod provider_config {
    use super::*;

    #[test]
    fn test_gemini_client_builder() {
        let client = GeminiClient::new()
            .with_api_key("test-key")
            .with_endpoint("https://example.test/v1beta")
            .with_model("models/gemini-1.5-pro");
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_openai_client_builder() {
        let client = OpenAiClient::new()
            .with_api_key("sk-proj-test-key")
            .with_endpoint("http://localhost:1234/v1")
            .with_model("gpt-4o-mini");
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn test_anthropic_client_builder() {
        let client = AnthropicClient::new()
            .with_api_key("sk-ant-REDACTED")
            .with_model("claude-3-5-haiku-latest");
        assert_eq!(client.name(), "anthropic");
    }

    #[test]
    fn test_ollama_client_builder() {
        let client = OllamaClient::new()
            .with_endpoint("http://localhost:11434")
            .with_model("llama3.2");
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_resilient_wrapper_keeps_provider_name() {
        let wrapped = ResilientLlmProvider::new(OllamaClient::new(), LlmResilienceConfig::default());
        assert_eq!(wrapped.name(), "ollama");
        assert!(!wrapped.is_circuit_open());
    }

    #[test]
    fn test_default_resilience_retries_once() {
        assert_eq!(LlmResilienceConfig::default().max_retries, 1);
    }
}

mod missing_credentials {
    use super::*;

    #[test]
    fn test_gemini_blank_key_fails_without_network() {
        let client = GeminiClient::new()
            .with_api_key("   ")
            .with_endpoint(UNREACHABLE);
        let err = client.complete("hello").unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_anthropic_malformed_key_is_rejected() {
        let client = AnthropicClient::new()
            .with_api_key("not-a-real-key")
            .with_endpoint(UNREACHABLE);
        let err = client.complete("hello").unwrap_err();
        assert!(err.to_string().contains("sk-ant-"));
    }
}

mod transport_errors {
    use super::*;

    #[test]
    fn test_unreachable_gemini_endpoint_is_transient() {
        let client = GeminiClient::new()
            .with_api_key("test-key")
            .with_endpoint(UNREACHABLE)
            .with_http_config(fast_http());
        let err = client.complete_with_system("system", "user").unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {err}");
    }

    #[test]
    fn test_unreachable_openai_endpoint_is_transient() {
        let client = OpenAiClient::new()
            .with_api_key("sk-test")
            .with_endpoint(UNREACHABLE)
            .with_http_config(fast_http());
        let err = client.complete("hello").unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {err}");
    }

    #[test]
    fn test_clients_built_with_timeouts_fail_fast() {
        let gemini = GeminiClient::from_http_config(fast_http())
            .with_api_key("test-key")
            .with_endpoint(UNREACHABLE);
        let anthropic = AnthropicClient::from_http_config(fast_http())
            .with_api_key("sk-ant-REDACTED")
            .with_endpoint(UNREACHABLE);
        let ollama = OllamaClient::from_http_config(fast_http()).with_endpoint(UNREACHABLE);

        let providers: [&dyn LlmProvider; 3] = [&gemini, &anthropic, &ollama];
        for provider in providers {
            let err = provider.complete("hello").unwrap_err();
            assert!(err.is_transient(), "{}: {err}", provider.name());
        }
    }

    #[test]
    fn test_ollama_unavailable() {
        let client = OllamaClient::new()
            .with_endpoint(UNREACHABLE)
            .with_http_config(fast_http());
        assert!(!client.is_available());
    }

    #[test]
    fn test_transient_classification() {
        let transient = ["timeout", "connect error: refused", "API returned status: 503"];
        for cause in transient {
            let err = Error::OperationFailed {
                operation: "x".to_string(),
                cause: cause.to_string(),
            };
            assert!(err.is_transient(), "{cause} should be transient");
        }

        let permanent = Error::OperationFailed {
            operation: "x".to_string(),
            cause: "API returned status: 401 Unauthorized".to_string(),
        };
        assert!(!permanent.is_transient());
        assert!(!Error::InvalidResponse("bad".to_string()).is_transient());
    }
}

mod resilience {
    use super::*;

    #[test]
    fn test_transient_failure_is_retried_once() {
        let provider = Arc::new(FlakyProvider::new(1, "API returned status: 503"));
        let resilient = ResilientLlmProvider::new(Arc::clone(&provider), no_wait(1, 3));

        assert!(resilient.complete("hi").is_ok());
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_retries_are_bounded() {
        let provider = Arc::new(FlakyProvider::new(10, "timeout"));
        let resilient = ResilientLlmProvider::new(Arc::clone(&provider), no_wait(1, 10));

        assert!(resilient.complete("hi").is_err());
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let provider = Arc::new(FlakyProvider::new(1, "API returned status: 400"));
        let resilient = ResilientLlmProvider::new(Arc::clone(&provider), no_wait(3, 3));

        assert!(resilient.complete("hi").is_err());
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_breaker_opens_after_threshold() {
        let provider = Arc::new(FlakyProvider::new(100, "API returned status: 401"));
        let resilient = ResilientLlmProvider::new(Arc::clone(&provider), no_wait(0, 2));

        assert!(resilient.complete("a").is_err());
        assert!(!resilient.is_circuit_open());
        assert!(resilient.complete("b").is_err());
        assert!(resilient.is_circuit_open());

        let err = resilient.complete("c").unwrap_err();
        assert!(err.to_string().contains("circuit breaker open"));
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let provider = Arc::new(FlakyProvider::new(1, "API returned status: 401"));
        let resilient = ResilientLlmProvider::new(Arc::clone(&provider), no_wait(0, 2));

        assert!(resilient.complete("a").is_err());
        assert!(resilient.complete("b").is_ok());
        assert!(!resilient.is_circuit_open());
    }
}
