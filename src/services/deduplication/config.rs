//! Deduplication configuration.

use crate::config::DedupeSettings;

/// Configuration for the sentence deduplicator.
///
/// Built from the `[dedupe]` config section, which
/// `DUPLITEXT_DEDUPE_LEGACY_LONE_PERIOD` overrides.
///
/// # Example
///
/// ```rust
/// use duplitext::services::DeduplicationConfig;
///
/// let config = DeduplicationConfig::default();
/// assert!(!config.legacy_lone_period);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeduplicationConfig {
    /// When the input has text but no non-empty sentence (e.g. `"?!"`), return
    /// a lone `"."` instead of the empty string.
    pub legacy_lone_period: bool,
}

impl DeduplicationConfig {
    /// Creates a configuration from config file settings.
    #[must_use]
    pub fn from_settings(settings: &DedupeSettings) -> Self {
        Self {
            legacy_lone_period: settings.legacy_lone_period,
        }
    }

    /// Sets the lone-period behavior.
    #[must_use]
    pub const fn with_legacy_lone_period(mut self, enabled: bool) -> Self {
        self.legacy_lone_period = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = DedupeSettings {
            legacy_lone_period: true,
        };
        assert!(DeduplicationConfig::from_settings(&settings).legacy_lone_period);
    }

    #[test]
    fn test_builder() {
        let config = DeduplicationConfig::default().with_legacy_lone_period(true);
        assert!(config.legacy_lone_period);
    }
}
