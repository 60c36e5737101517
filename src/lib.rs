//! # duplitext
//!
//! Duplicate sentence removal and LLM-backed structured data extraction.
//!
//! Text goes through two steps:
//!
//! 1. The [`SentenceDeduplicator`] removes case-insensitive duplicate sentences,
//!    optionally unwrapping a `{"Data": "..."}` JSON envelope first.
//! 2. An [`Extractor`] pulls users, outputs, times and dates out of the
//!    deduplicated text. [`LlmExtractor`] does this with a hosted model.
//!
//! [`ProcessingService`] runs both steps and reduces any extraction failure to
//! a single user-facing notice.
//!
//! ## Example
//!
//! ```rust
//! use duplitext::dedupe;
//!
//! assert_eq!(dedupe("Hello world. Hello world!"), "Hello world.");
//! assert_eq!(dedupe(r#"{"Data": "Cat sat. Cat sat."}"#), "Cat sat.");
//! ```
//!
//! ```rust,ignore
//! use duplitext::{ProcessingService, LlmExtractor};
//! use duplitext::cli::build_llm_provider;
//!
//! let config = duplitext::DuplitextConfig::load_default();
//! let extractor = LlmExtractor::new(build_llm_provider(&config.llm));
//! let service = ProcessingService::new(extractor);
//! let outcome = service.process("Alice ran the build at 9am. Alice ran the build at 9am.")?;
//! println!("{}", serde_json::to_string_pretty(&outcome.record)?);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;

pub use config::{DedupeSettings, DuplitextConfig, LlmConfig};
pub use llm::LlmProvider;
pub use models::{DedupeOutcome, ExtractRequest, ExtractedRecord, ProcessOutcome};
pub use services::{
    DeduplicationConfig, Extractor, LlmExtractor, ProcessingService, SentenceDeduplicator, dedupe,
};

/// Notice shown to the end user when any step of the pipeline fails.
pub const PROCESSING_FAILED_NOTICE: &str = "Failed to process text. Please try again.";

/// Notice shown when the pipeline is asked to process empty input.
pub const EMPTY_INPUT_NOTICE: &str = "Please enter text to process.";

/// Error type for duplitext operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty pipeline input, unreadable input files |
/// | `OperationFailed` | HTTP errors, config file I/O, logging setup |
/// | `InvalidResponse` | Model output that does not match the extraction schema |
/// | `ProcessingFailed` | Any failure inside the dedupe-then-extract pipeline |
/// | `FeatureNotEnabled` | `serve` without the `http` feature |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - An LLM provider request fails or returns a non-success status
    /// - The config file cannot be read or parsed
    /// - The tracing subscriber cannot be installed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The model answered with something that is not a valid extraction record.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// The pipeline failed. Displays only the user-facing notice; the cause is
    /// kept for logs.
    #[error("Failed to process text. Please try again.")]
    ProcessingFailed {
        /// The underlying cause.
        cause: String,
    },

    /// Feature not enabled (requires feature flag).
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

impl Error {
    /// Returns the text shown to an end user.
    ///
    /// Input errors carry a ready-made notice and are shown without the
    /// variant prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns true for failures worth one more attempt: timeouts, connection
    /// errors, rate limiting and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::OperationFailed { cause, .. } => {
                let lower = cause.to_lowercase();
                lower.contains("timeout")
                    || lower.contains("timed out")
                    || lower.contains("connect error")
                    || lower.contains("status: 429")
                    || lower.contains("status: 5")
            },
            _ => false,
        }
    }
}

/// Result type alias for duplitext operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::ProcessingFailed {
            cause: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), PROCESSING_FAILED_NOTICE);
    }

    #[test]
    fn test_user_message_drops_variant_prefix() {
        let err = Error::InvalidInput(EMPTY_INPUT_NOTICE.to_string());
        assert_eq!(err.user_message(), EMPTY_INPUT_NOTICE);

        let err = Error::ProcessingFailed {
            cause: "API returned status: 500".to_string(),
        };
        assert_eq!(err.user_message(), PROCESSING_FAILED_NOTICE);

        let err = Error::FeatureNotEnabled("http".to_string());
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn test_transient_classification() {
        let timeout = Error::OperationFailed {
            operation: "gemini_request".to_string(),
            cause: "timeout error: operation timed out".to_string(),
        };
        assert!(timeout.is_transient());

        let overloaded = Error::OperationFailed {
            operation: "openai_request".to_string(),
            cause: "API returned status: 503 Service Unavailable - overloaded".to_string(),
        };
        assert!(overloaded.is_transient());

        let rate_limited = Error::OperationFailed {
            operation: "openai_request".to_string(),
            cause: "API returned status: 429 Too Many Requests - slow down".to_string(),
        };
        assert!(rate_limited.is_transient());

        let unauthorized = Error::OperationFailed {
            operation: "openai_request".to_string(),
            cause: "API returned status: 401 Unauthorized - bad key".to_string(),
        };
        assert!(!unauthorized.is_transient());

        assert!(!Error::InvalidResponse("not json".to_string()).is_transient());
    }
}
