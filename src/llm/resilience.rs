//! Retry and circuit breaking around an [`LlmProvider`].

use super::LlmProvider;
use crate::{Error, Result};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Resilience configuration for LLM calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResilienceConfig {
    /// Retries after a transient failure.
    pub max_retries: u32,
    /// Pause between attempts in milliseconds.
    pub retry_backoff_ms: u64,
    /// Consecutive failed calls before the circuit opens.
    pub breaker_failure_threshold: u32,
    /// How long the circuit stays open before a trial call.
    pub breaker_reset_timeout_ms: u64,
    /// Trial calls allowed while half-open.
    pub breaker_half_open_max_calls: u32,
}

impl Default for LlmResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            retry_backoff_ms: 250,
            breaker_failure_threshold: 3,
            breaker_reset_timeout_ms: 30_000,
            breaker_half_open_max_calls: 1,
        }
    }
}

impl LlmResilienceConfig {
    /// Loads resilience configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(max_retries) = config.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(retry_backoff_ms) = config.retry_backoff_ms {
            settings.retry_backoff_ms = retry_backoff_ms;
        }
        if let Some(threshold) = config.breaker_failure_threshold {
            settings.breaker_failure_threshold = threshold.max(1);
        }
        if let Some(reset_ms) = config.breaker_reset_ms {
            settings.breaker_reset_timeout_ms = reset_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(parsed) = env_parse::<u32>("DUPLITEXT_LLM_MAX_RETRIES") {
            self.max_retries = parsed;
        }
        if let Some(parsed) = env_parse::<u64>("DUPLITEXT_LLM_RETRY_BACKOFF_MS") {
            self.retry_backoff_ms = parsed;
        }
        if let Some(parsed) = env_parse::<u32>("DUPLITEXT_LLM_BREAKER_FAILURE_THRESHOLD") {
            self.breaker_failure_threshold = parsed.max(1);
        }
        if let Some(parsed) = env_parse::<u64>("DUPLITEXT_LLM_BREAKER_RESET_MS") {
            self.breaker_reset_timeout_ms = parsed;
        }
        self
    }

    /// Disables retries and backoff.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.max_retries = 0;
        self.retry_backoff_ms = 0;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[derive(Debug)]
enum BreakerState {
    Closed { failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { attempts: u32 },
}

#[derive(Debug)]
struct CircuitBreaker {
    state: BreakerState,
    failure_threshold: u32,
    reset_timeout: Duration,
    half_open_max_calls: u32,
}

impl CircuitBreaker {
    fn new(config: &LlmResilienceConfig) -> Self {
        Self {
            state: BreakerState::Closed { failures: 0 },
            failure_threshold: config.breaker_failure_threshold.max(1),
            reset_timeout: Duration::from_millis(config.breaker_reset_timeout_ms),
            half_open_max_calls: config.breaker_half_open_max_calls.max(1),
        }
    }

    fn allow(&mut self) -> bool {
        match self.state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { opened_at } => {
                if opened_at.elapsed() >= self.reset_timeout {
                    self.state = BreakerState::HalfOpen { attempts: 1 };
                    true
                } else {
                    false
                }
            },
            BreakerState::HalfOpen { ref mut attempts } => {
                if *attempts >= self.half_open_max_calls {
                    false
                } else {
                    *attempts += 1;
                    true
                }
            },
        }
    }

    const fn on_success(&mut self) {
        self.state = BreakerState::Closed { failures: 0 };
    }

    /// Records a failed call. Returns true when this failure opened the circuit.
    fn on_failure(&mut self) -> bool {
        match self.state {
            BreakerState::Closed { ref mut failures } => {
                *failures += 1;
                if *failures >= self.failure_threshold {
                    self.state = BreakerState::Open {
                        opened_at: Instant::now(),
                    };
                    return true;
                }
                false
            },
            BreakerState::HalfOpen { .. } => {
                self.state = BreakerState::Open {
                    opened_at: Instant::now(),
                };
                true
            },
            BreakerState::Open { .. } => false,
        }
    }

    const fn is_open(&self) -> bool {
        matches!(self.state, BreakerState::Open { .. })
    }
}

/// LLM provider wrapper with bounded retries and a circuit breaker.
///
/// A call is retried only when the failure is transient (see
/// [`Error::is_transient`]). Each logical call counts once towards the
/// breaker, however many attempts it took.
pub struct ResilientLlmProvider<P: LlmProvider> {
    inner: P,
    config: LlmResilienceConfig,
    breaker: Mutex<CircuitBreaker>,
}

impl<P: LlmProvider> ResilientLlmProvider<P> {
    /// Creates a new resilient LLM provider wrapper.
    #[must_use]
    pub fn new(inner: P, config: LlmResilienceConfig) -> Self {
        let breaker = CircuitBreaker::new(&config);
        Self {
            inner,
            config,
            breaker: Mutex::new(breaker),
        }
    }

    /// Returns the wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Returns true while calls are being rejected.
    pub fn is_circuit_open(&self) -> bool {
        self.breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_open()
    }

    fn execute<F>(&self, operation: &'static str, mut call: F) -> Result<String>
    where
        F: FnMut() -> Result<String>,
    {
        let provider = self.inner.name();
        let span = tracing::info_span!(
            "llm.request",
            provider = provider,
            operation = operation,
            status = tracing::field::Empty
        );
        let _enter = span.enter();

        let allowed = self
            .breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .allow();
        if !allowed {
            span.record("status", "circuit_open");
            metrics::counter!(
                "llm_requests_total",
                "provider" => provider,
                "status" => "circuit_open"
            )
            .increment(1);
            return Err(Error::OperationFailed {
                operation: format!("llm_{operation}"),
                cause: "circuit breaker open".to_string(),
            });
        }

        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let started = Instant::now();
            let result = call();
            let status = match &result {
                Ok(_) => "success",
                Err(err) if err.is_transient() => "transient_error",
                Err(_) => "error",
            };
            Self::record_attempt(provider, status, started.elapsed());

            match result {
                Ok(value) => {
                    self.breaker
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .on_success();
                    span.record("status", "success");
                    return Ok(value);
                },
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    metrics::counter!("llm_retries_total", "provider" => provider).increment(1);
                    tracing::warn!(
                        provider,
                        attempt,
                        error = %err,
                        "Retrying LLM call after transient failure"
                    );
                    if self.config.retry_backoff_ms > 0 {
                        std::thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                    }
                },
                Err(err) => {
                    self.record_failure(provider);
                    span.record("status", status);
                    return Err(err);
                },
            }
        }
    }

    fn record_failure(&self, provider: &'static str) {
        let tripped = self
            .breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_failure();
        if tripped {
            metrics::counter!("llm_circuit_breaker_trips_total", "provider" => provider)
                .increment(1);
            tracing::warn!(provider, "LLM circuit breaker opened");
        }
    }

    fn record_attempt(provider: &'static str, status: &'static str, elapsed: Duration) {
        metrics::counter!(
            "llm_requests_total",
            "provider" => provider,
            "status" => status
        )
        .increment(1);
        metrics::histogram!("llm_request_duration_ms", "provider" => provider)
            .record(elapsed.as_secs_f64() * 1000.0);
    }
}

impl<P: LlmProvider> LlmProvider for ResilientLlmProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.execute("complete", || self.inner.complete(prompt))
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.execute("complete_with_system", || {
            self.inner.complete_with_system(system, user)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        calls: AtomicU32,
        failures_before_success: u32,
        cause: &'static str,
    }

    impl ScriptedProvider {
        fn new(failures_before_success: u32, cause: &'static str) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures_before_success,
                cause,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures_before_success {
                Err(Error::OperationFailed {
                    operation: "scripted_request".to_string(),
                    cause: self.cause.to_string(),
                })
            } else {
                Ok("{}".to_string())
            }
        }
    }

    fn fast_config() -> LlmResilienceConfig {
        LlmResilienceConfig {
            retry_backoff_ms: 0,
            ..LlmResilienceConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = LlmResilienceConfig::default();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.breaker_failure_threshold, 3);
    }

    #[test]
    fn test_from_config_clamps_threshold() {
        let llm = crate::config::LlmConfig {
            max_retries: Some(4),
            breaker_failure_threshold: Some(0),
            ..Default::default()
        };
        let config = LlmResilienceConfig::from_config(&llm);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.breaker_failure_threshold, 1);
    }

    #[test]
    fn test_retries_transient_failure_once() {
        let provider = ResilientLlmProvider::new(
            ScriptedProvider::new(1, "timeout error: operation timed out"),
            fast_config(),
        );
        assert_eq!(provider.complete("x").unwrap(), "{}");
        assert_eq!(provider.inner().calls(), 2);
    }

    #[test]
    fn test_does_not_retry_permanent_failure() {
        let provider = ResilientLlmProvider::new(
            ScriptedProvider::new(1, "API returned status: 401 Unauthorized - no"),
            fast_config(),
        );
        assert!(provider.complete("x").is_err());
        assert_eq!(provider.inner().calls(), 1);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let provider = ResilientLlmProvider::new(
            ScriptedProvider::new(10, "API returned status: 503 - busy"),
            fast_config(),
        );
        assert!(provider.complete("x").is_err());
        assert_eq!(provider.inner().calls(), 2);
    }

    #[test]
    fn test_breaker_opens_and_rejects() {
        let config = LlmResilienceConfig {
            breaker_failure_threshold: 2,
            ..fast_config().without_retries()
        };
        let provider =
            ResilientLlmProvider::new(ScriptedProvider::new(10, "connect error: refused"), config);

        assert!(provider.complete("x").is_err());
        assert!(!provider.is_circuit_open());
        assert!(provider.complete("x").is_err());
        assert!(provider.is_circuit_open());

        let err = provider.complete("x").unwrap_err();
        assert!(err.to_string().contains("circuit breaker open"));
        assert_eq!(provider.inner().calls(), 2);
    }

    #[test]
    fn test_breaker_half_open_recovers() {
        let config = LlmResilienceConfig {
            breaker_failure_threshold: 1,
            breaker_reset_timeout_ms: 0,
            ..fast_config().without_retries()
        };
        let provider =
            ResilientLlmProvider::new(ScriptedProvider::new(1, "connect error: refused"), config);

        assert!(provider.complete("x").is_err());
        assert!(provider.is_circuit_open());
        assert_eq!(provider.complete("x").unwrap(), "{}");
        assert!(!provider.is_circuit_open());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let config = LlmResilienceConfig {
            breaker_failure_threshold: 2,
            ..fast_config().without_retries()
        };
        let provider =
            ResilientLlmProvider::new(ScriptedProvider::new(1, "bad request"), config);

        assert!(provider.complete("x").is_err());
        assert!(provider.complete("x").is_ok());
        assert!(!provider.is_circuit_open());
    }
}
