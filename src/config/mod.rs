//! Configuration management.
//!
//! Settings come from a TOML file, then environment variables. `${VAR}`
//! references inside string values are expanded when the file is loaded.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for duplitext.
#[derive(Debug, Clone, Default)]
pub struct DuplitextConfig {
    /// LLM provider configuration.
    pub llm: LlmConfig,
    /// Deduplication settings.
    pub dedupe: DedupeSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Config files that were loaded, in order.
    pub config_sources: Vec<PathBuf>,
}

/// LLM provider configuration.
///
/// Unset values fall back to each provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    /// Provider to use.
    pub provider: LlmProviderKind,
    /// Model name.
    pub model: Option<String>,
    /// API key (may reference an environment variable like `${GEMINI_API_KEY}`).
    pub api_key: Option<String>,
    /// Base URL for the provider (proxies, self-hosted endpoints).
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Retries after a transient failure.
    pub max_retries: Option<u32>,
    /// Pause between attempts in milliseconds.
    pub retry_backoff_ms: Option<u64>,
    /// Consecutive failures before the circuit breaker opens.
    pub breaker_failure_threshold: Option<u32>,
    /// How long the circuit breaker stays open in milliseconds.
    pub breaker_reset_ms: Option<u64>,
    /// Completion token limit.
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    /// Returns the API key with all but the last four characters masked.
    #[must_use]
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }
}

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProviderKind {
    /// Google Gemini.
    #[default]
    Gemini,
    /// `OpenAI` or any compatible endpoint.
    OpenAi,
    /// Anthropic Claude.
    Anthropic,
    /// Ollama (local).
    Ollama,
}

impl LlmProviderKind {
    /// Parses a provider string. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" | "googleai" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Returns the canonical provider name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplication settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeSettings {
    /// Return `"."` when no sentence survives.
    pub legacy_lone_period: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Default filter directive, e.g. `info` or `duplitext=debug`.
    pub level: Option<String>,
    /// Log file path; stderr when unset.
    pub file: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Deduplication configuration.
    pub dedupe: Option<ConfigFileDedupe>,
    /// Logging configuration.
    pub logging: Option<ConfigFileLogging>,
    /// Server configuration.
    pub server: Option<ConfigFileServer>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
#[allow(missing_docs)]
pub struct ConfigFileLlm {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub breaker_failure_threshold: Option<u32>,
    pub breaker_reset_ms: Option<u64>,
    pub max_tokens: Option<u32>,
}

/// Dedupe section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileDedupe {
    /// Return `"."` when no sentence survives.
    pub legacy_lone_period: Option<bool>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileServer {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: Option<usize>,
}

impl DuplitextConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.config_sources.push(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/duplitext/` on macOS)
    /// 2. XDG config dir (`~/.config/duplitext/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found. Environment
    /// overrides are not applied.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("duplitext").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("duplitext")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `DuplitextConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = LlmProviderKind::parse(&provider).ok_or_else(|| {
                    crate::Error::OperationFailed {
                        operation: "parse_config_file".to_string(),
                        cause: format!("unknown llm provider '{provider}'"),
                    }
                })?;
            }
            config.llm.model = llm.model.map(|v| expand_env_vars(&v));
            config.llm.api_key = llm
                .api_key
                .map(|v| expand_env_vars(&v))
                .filter(|v| !v.is_empty());
            config.llm.base_url = llm.base_url.map(|v| expand_env_vars(&v));
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
            config.llm.max_retries = llm.max_retries;
            config.llm.retry_backoff_ms = llm.retry_backoff_ms;
            config.llm.breaker_failure_threshold = llm.breaker_failure_threshold;
            config.llm.breaker_reset_ms = llm.breaker_reset_ms;
            config.llm.max_tokens = llm.max_tokens;
        }
        if let Some(dedupe) = file.dedupe {
            if let Some(v) = dedupe.legacy_lone_period {
                config.dedupe.legacy_lone_period = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging.format = logging.format;
            config.logging.level = logging.level;
            config.logging.file = logging.file.map(|v| PathBuf::from(expand_env_vars(&v)));
        }
        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(max_body_bytes) = server.max_body_bytes {
                config.server.max_body_bytes = max_body_bytes;
            }
        }

        Ok(config)
    }

    /// Applies `DUPLITEXT_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(provider) = env_var("DUPLITEXT_LLM_PROVIDER") {
            match LlmProviderKind::parse(&provider) {
                Some(kind) => self.llm.provider = kind,
                None => tracing::warn!(provider = %provider, "Ignoring unknown DUPLITEXT_LLM_PROVIDER"),
            }
        }
        if let Some(model) = env_var("DUPLITEXT_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(base_url) = env_var("DUPLITEXT_LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if let Some(v) = env_parse("DUPLITEXT_LLM_TIMEOUT_MS") {
            self.llm.timeout_ms = Some(v);
        }
        if let Some(v) = env_parse("DUPLITEXT_LLM_CONNECT_TIMEOUT_MS") {
            self.llm.connect_timeout_ms = Some(v);
        }
        if let Some(v) = env_parse("DUPLITEXT_LLM_MAX_RETRIES") {
            self.llm.max_retries = Some(v);
        }
        if let Some(v) = env_parse("DUPLITEXT_LLM_RETRY_BACKOFF_MS") {
            self.llm.retry_backoff_ms = Some(v);
        }
        if let Some(v) = env_var("DUPLITEXT_DEDUPE_LEGACY_LONE_PERIOD").and_then(|v| parse_bool(&v))
        {
            self.dedupe.legacy_lone_period = v;
        }
        if let Some(format) = env_var("DUPLITEXT_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = env_var("DUPLITEXT_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        self
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.parse().ok())
}

/// Parses a boolean flag value (`1/0`, `true/false`, `yes/no`, `on/off`).
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

static ENV_VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap_or_else(|_| unreachable!())
});

/// Expands `${VAR}` references from the environment. Unset variables expand
/// to the empty string.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(value, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
