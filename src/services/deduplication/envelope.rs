//! JSON envelope detection.
//!
//! Input may be a JSON object of the form `{"Data": "..."}`. Anything else,
//! including malformed JSON, is plain text.

use serde_json::Value;

/// Key holding the wrapped text.
pub const ENVELOPE_KEY: &str = "Data";

/// How the raw input was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<'a> {
    /// A JSON object whose `Data` field is a string.
    Data(String),
    /// Anything else, used as-is.
    PlainText(&'a str),
}

impl Envelope<'_> {
    /// Returns the working text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Data(text) => text.as_str(),
            Self::PlainText(text) => *text,
        }
    }

    /// Returns true if the text was taken from a `Data` field.
    #[must_use]
    pub const fn is_unwrapped(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

/// Interprets raw input as either a `Data` envelope or plain text.
pub fn unwrap_envelope(input: &str) -> Envelope<'_> {
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(mut map)) => match map.remove(ENVELOPE_KEY) {
            Some(Value::String(text)) => Envelope::Data(text),
            Some(other) => {
                tracing::debug!(
                    kind = json_kind(&other),
                    "JSON input has a non-string Data field, processing as plain text"
                );
                Envelope::PlainText(input)
            },
            None => Envelope::PlainText(input),
        },
        Ok(_) => Envelope::PlainText(input),
        Err(e) => {
            tracing::debug!(error = %e, "Input is not JSON, processing as plain text");
            Envelope::PlainText(input)
        },
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope() {
        let envelope = unwrap_envelope(r#"{"Data": "Cat sat. Cat sat."}"#);
        assert_eq!(envelope, Envelope::Data("Cat sat. Cat sat.".to_string()));
        assert!(envelope.is_unwrapped());
        assert_eq!(envelope.text(), "Cat sat. Cat sat.");
    }

    #[test]
    fn test_envelope_with_extra_fields() {
        let envelope = unwrap_envelope(r#"{"Id": 7, "Data": "Hi.", "Meta": {"a": 1}}"#);
        assert_eq!(envelope.text(), "Hi.");
    }

    #[test]
    fn test_plain_text() {
        let envelope = unwrap_envelope("Just some words.");
        assert_eq!(envelope, Envelope::PlainText("Just some words."));
        assert!(!envelope.is_unwrapped());
    }

    #[test]
    fn test_malformed_json_is_plain_text() {
        let input = "not json { still text. still text.";
        assert_eq!(unwrap_envelope(input), Envelope::PlainText(input));
    }

    #[test]
    fn test_object_without_data_is_plain_text() {
        let input = r#"{"data": "lowercase key does not count"}"#;
        assert_eq!(unwrap_envelope(input), Envelope::PlainText(input));
    }

    #[test]
    fn test_non_string_data_is_plain_text() {
        let input = r#"{"Data": ["a", "b"]}"#;
        assert_eq!(unwrap_envelope(input), Envelope::PlainText(input));

        let input = r#"{"Data": null}"#;
        assert_eq!(unwrap_envelope(input), Envelope::PlainText(input));
    }

    #[test]
    fn test_non_object_json_is_plain_text() {
        for input in [r#""quoted""#, "42", "[1, 2]", "true", "null"] {
            assert_eq!(unwrap_envelope(input), Envelope::PlainText(input));
        }
    }
}
