//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Default filter directive when nothing else is configured.
    pub const DEFAULT_LEVEL: &'static str = "warn";

    /// Builds the logging configuration.
    ///
    /// Filter precedence: `DUPLITEXT_LOG`, `RUST_LOG`, `debug` when `verbose`,
    /// the configured level, then [`Self::DEFAULT_LEVEL`].
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .and_then(LogFormat::parse)
            .unwrap_or_default();

        let directive = env_directive().unwrap_or_else(|| {
            if verbose {
                "debug".to_string()
            } else {
                settings
                    .and_then(|s| s.level.clone())
                    .unwrap_or_else(|| Self::DEFAULT_LEVEL.to_string())
            }
        });

        Self {
            format,
            filter: parse_filter(&directive),
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

fn env_directive() -> Option<String> {
    ["DUPLITEXT_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn parse_filter(directive: &str) -> EnvFilter {
    // The subscriber is not installed yet, so a bad directive cannot be logged.
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(LoggingConfig::DEFAULT_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_from_settings_uses_configured_format_and_file() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            level: Some("info".to_string()),
            file: Some(PathBuf::from("/tmp/duplitext.log")),
        };
        let config = LoggingConfig::from_settings(Some(&settings), false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/duplitext.log")));
    }

    #[test]
    fn test_unknown_format_falls_back_to_pretty() {
        let settings = LoggingSettings {
            format: Some("yaml".to_string()),
            ..Default::default()
        };
        let config = LoggingConfig::from_settings(Some(&settings), true);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        let filter = parse_filter("duplitext=loud");
        assert_eq!(filter.to_string(), LoggingConfig::DEFAULT_LEVEL);
    }
}
