//! Extraction request and record types.

use serde::{Deserialize, Serialize};

/// Request to extract structured data from text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// The text to extract data from.
    pub text: String,
}

impl ExtractRequest {
    /// Creates a new extraction request.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Structured data extracted from text.
///
/// Always carries all four fields; a field with no matches is an empty list.
/// Serializes as `{"user": [], "output": [], "time": [], "date": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// The users mentioned in the text.
    #[serde(default)]
    pub user: Vec<String>,
    /// The outputs or results mentioned in the text.
    #[serde(default)]
    pub output: Vec<String>,
    /// The times mentioned in the text.
    #[serde(default)]
    pub time: Vec<String>,
    /// The dates mentioned in the text.
    #[serde(default)]
    pub date: Vec<String>,
}

/// One of the four record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// `user`
    User,
    /// `output`
    Output,
    /// `time`
    Time,
    /// `date`
    Date,
}

impl RecordField {
    /// Returns all fields in schema order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Output, Self::Time, Self::Date]
    }

    /// Returns the JSON key for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Output => "output",
            Self::Time => "time",
            Self::Date => "date",
        }
    }
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractedRecord {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user: Vec::new(),
            output: Vec::new(),
            time: Vec::new(),
            date: Vec::new(),
        }
    }

    /// Returns the values for a field.
    #[must_use]
    pub fn field(&self, field: RecordField) -> &[String] {
        match field {
            RecordField::User => &self.user,
            RecordField::Output => &self.output,
            RecordField::Time => &self.time,
            RecordField::Date => &self.date,
        }
    }

    /// Returns a mutable reference to the values for a field.
    pub const fn field_mut(&mut self, field: RecordField) -> &mut Vec<String> {
        match field {
            RecordField::User => &mut self.user,
            RecordField::Output => &mut self.output,
            RecordField::Time => &mut self.time,
            RecordField::Date => &mut self.date,
        }
    }

    /// Returns true if no field has any value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        RecordField::all()
            .iter()
            .all(|field| self.field(*field).is_empty())
    }

    /// Total number of extracted values across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        RecordField::all()
            .iter()
            .map(|field| self.field(*field).len())
            .sum()
    }
}
