//! Structured data extraction.
//!
//! Pulls users, outputs, times and dates out of free text. The model-backed
//! [`LlmExtractor`] asks a provider for a JSON object and validates it into an
//! [`ExtractedRecord`] before handing it back.

use crate::llm::system_prompt::unescape_xml;
use crate::llm::{
    EXTRACTION_SYSTEM_PROMPT, LlmProvider, build_extraction_user_prompt,
    extract_json_from_response,
};
use crate::models::{ExtractRequest, ExtractedRecord, RecordField};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Extracts structured data from text.
///
/// Implementations must always return all four fields, using empty lists for
/// anything not found.
pub trait Extractor: Send + Sync {
    /// Extracts a record from the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing service fails or answers with something
    /// that does not fit the record schema.
    fn extract(&self, text: &str) -> Result<ExtractedRecord>;

    /// Extracts a record for a request.
    ///
    /// # Errors
    ///
    /// Same as [`Extractor::extract`].
    fn extract_request(&self, request: &ExtractRequest) -> Result<ExtractedRecord> {
        self.extract(&request.text)
    }
}

impl<E: Extractor + ?Sized> Extractor for Arc<E> {
    fn extract(&self, text: &str) -> Result<ExtractedRecord> {
        (**self).extract(text)
    }
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn extract(&self, text: &str) -> Result<ExtractedRecord> {
        (**self).extract(text)
    }
}

/// Extractor backed by a language model.
///
/// # Example
///
/// ```rust,ignore
/// use duplitext::services::{Extractor, LlmExtractor};
/// use duplitext::llm::GeminiClient;
/// use std::sync::Arc;
///
/// let extractor = LlmExtractor::new(Arc::new(GeminiClient::new()));
/// let record = extractor.extract("Alice deployed v2 at 10:00 on 2024-05-01.")?;
/// assert!(record.user.contains(&"Alice".to_string()));
/// ```
#[derive(Clone)]
pub struct LlmExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl LlmExtractor {
    /// Creates an extractor using the given provider.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Returns the provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.llm.name()
    }

    fn parse_response(response: &str) -> Result<ExtractedRecord> {
        let json_str = extract_json_from_response(response);
        let value: Value = serde_json::from_str(json_str).map_err(|e| {
            tracing::warn!(error = %e, response_length = response.len(), "Model response is not JSON");
            Error::InvalidResponse(format!("not a JSON object: {e}"))
        })?;
        validate_record(value)
    }
}

impl std::fmt::Debug for LlmExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmExtractor")
            .field("provider", &self.llm.name())
            .finish()
    }
}

impl Extractor for LlmExtractor {
    #[instrument(
        skip(self, text),
        fields(operation = "extract", provider = self.llm.name(), text_length = text.len())
    )]
    fn extract(&self, text: &str) -> Result<ExtractedRecord> {
        if text.trim().is_empty() {
            return Ok(ExtractedRecord::new());
        }

        let start = Instant::now();
        let provider = self.llm.name();
        let user = build_extraction_user_prompt(text);

        let result = self
            .llm
            .complete_with_system(EXTRACTION_SYSTEM_PROMPT, &user)
            .and_then(|response| Self::parse_response(&response));

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "extraction_requests_total",
            "provider" => provider,
            "status" => status
        )
        .increment(1);
        metrics::histogram!("extraction_duration_ms", "provider" => provider)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        if let Ok(record) = &result {
            tracing::debug!(values = record.len(), "Extracted record");
        }
        result
    }
}

/// Validates a parsed model response into an [`ExtractedRecord`].
///
/// - the top level must be an object
/// - a missing or `null` field becomes an empty list
/// - strings are trimmed and blanks dropped; numbers and booleans become strings
/// - nested objects, arrays or nulls inside a list reject the response
/// - unknown keys are ignored
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] if the value does not fit the schema.
pub fn validate_record(value: Value) -> Result<ExtractedRecord> {
    let Value::Object(mut map) = value else {
        return Err(Error::InvalidResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )));
    };

    let mut record = ExtractedRecord::new();
    for field in RecordField::all() {
        let values = match map.remove(field.as_str()) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => validate_items(*field, items)?,
            Some(other) => {
                return Err(Error::InvalidResponse(format!(
                    "field '{field}' must be an array, got {}",
                    json_type_name(&other)
                )));
            },
        };
        *record.field_mut(*field) = values;
    }

    if !map.is_empty() {
        let unknown: Vec<&str> = map.keys().map(String::as_str).collect();
        tracing::debug!(?unknown, "Ignoring unknown keys in model response");
    }

    Ok(record)
}

fn validate_items(field: RecordField, items: Vec<Value>) -> Result<Vec<String>> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let value = match item {
            Value::String(s) => unescape_xml(s.trim()),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::InvalidResponse(format!(
                    "field '{field}' contains {}, expected strings",
                    json_type_name(&other)
                )));
            },
        };
        if !value.is_empty() {
            values.push(value);
        }
    }
    Ok(values)
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedProvider {
        response: Result<String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedProvider {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            unreachable!("extractor always sends a system prompt")
        }

        fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            match &self.response {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(Error::OperationFailed {
                    operation: "canned".to_string(),
                    cause: e.to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_extract_parses_full_record() {
        let provider = CannedProvider::ok(
            r#"{"user": ["Alice"], "output": ["build passed"], "time": ["9am"], "date": ["2024-05-01"]}"#,
        );
        let extractor = LlmExtractor::new(provider.clone());
        let record = extractor.extract("Alice: build passed at 9am on 2024-05-01.").unwrap();

        assert_eq!(record.user, vec!["Alice"]);
        assert_eq!(record.output, vec!["build passed"]);
        assert_eq!(record.time, vec!["9am"]);
        assert_eq!(record.date, vec!["2024-05-01"]);

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, EXTRACTION_SYSTEM_PROMPT);
        assert!(prompts[0].1.contains("Alice: build passed"));
    }

    #[test]
    fn test_extract_accepts_fenced_response() {
        let provider = CannedProvider::ok("```json\n{\"user\": [\"Bob\"]}\n```");
        let record = LlmExtractor::new(provider).extract("Bob was here.").unwrap();
        assert_eq!(record.user, vec!["Bob"]);
        assert!(record.date.is_empty());
    }

    #[test]
    fn test_extract_empty_text_skips_model() {
        let provider = CannedProvider::ok("not used");
        let record = LlmExtractor::new(provider.clone()).extract("   ").unwrap();
        assert!(record.is_empty());
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_extract_rejects_prose() {
        let provider = CannedProvider::ok("I could not find anything.");
        let err = LlmExtractor::new(provider).extract("text").unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_propagates_provider_error() {
        let provider = Arc::new(CannedProvider {
            response: Err(Error::InvalidInput("boom".to_string())),
            prompts: Mutex::new(Vec::new()),
        });
        let err = LlmExtractor::new(provider).extract("text").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_validate_missing_and_null_fields() {
        let record = validate_record(json!({"user": ["a"], "time": null})).unwrap();
        assert_eq!(record.user, vec!["a"]);
        assert!(record.output.is_empty());
        assert!(record.time.is_empty());
        assert!(record.date.is_empty());
    }

    #[test]
    fn test_validate_coerces_scalars_and_trims() {
        let record =
            validate_record(json!({"output": ["  done  ", "", 42, true], "date": [" "]})).unwrap();
        assert_eq!(record.output, vec!["done", "42", "true"]);
        assert!(record.date.is_empty());
    }

    #[test]
    fn test_validate_unescapes_values() {
        let record = validate_record(json!({"user": ["Tom &amp; Jerry"]})).unwrap();
        assert_eq!(record.user, vec!["Tom & Jerry"]);
    }

    #[test]
    fn test_validate_ignores_unknown_keys() {
        let record = validate_record(json!({"user": [], "mood": ["happy"]})).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(validate_record(json!(["user"])).is_err());
        assert!(validate_record(json!("text")).is_err());
        assert!(validate_record(json!({"user": "Alice"})).is_err());
        assert!(validate_record(json!({"user": [{"name": "Alice"}]})).is_err());
        assert!(validate_record(json!({"date": [["2024"]]})).is_err());
        assert!(validate_record(json!({"time": [null]})).is_err());
    }

    #[test]
    fn test_extractor_through_arc_and_box() {
        let extractor = LlmExtractor::new(CannedProvider::ok(r#"{"user": ["x"]}"#));
        let shared: Arc<dyn Extractor> = Arc::new(extractor.clone());
        let boxed: Box<dyn Extractor> = Box::new(extractor);
        assert_eq!(shared.extract("x").unwrap().user, vec!["x"]);
        assert_eq!(
            boxed
                .extract_request(&ExtractRequest::new("x"))
                .unwrap()
                .user,
            vec!["x"]
        );
    }
}
