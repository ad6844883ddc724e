//! # Validation Reports
//!
//! Structured accumulation of data errors for one validation run.
//!
//! A run produces an ordered list of [`ValidationError`] records. Most carry a
//! single message; a nested schema failure is folded into one record at the
//! parent key whose message is the list of nested messages. The
//! [`ErrorCollector`] exposes both a flattened (message-only) view and the
//! grouped records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The message of a validation error: one line, or the folded messages of a
/// nested schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Nested(Vec<String>),
}

impl ErrorMessage {
    /// Iterate over the individual message lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ErrorMessage::Single(s) => std::slice::from_ref(s),
            ErrorMessage::Nested(v) => v,
        };
        slice.iter().map(String::as_str)
    }

    /// Returns true if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }
}

impl From<String> for ErrorMessage {
    fn from(s: String) -> Self {
        ErrorMessage::Single(s)
    }
}

impl From<&str> for ErrorMessage {
    fn from(s: &str) -> Self {
        ErrorMessage::Single(s.to_string())
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(v: Vec<String>) -> Self {
        ErrorMessage::Nested(v)
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Single(s) => f.write_str(s),
            ErrorMessage::Nested(v) => f.write_str(&v.join("; ")),
        }
    }
}

/// One data error, attributed to a top-level key of the validated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: String,
    pub message: ErrorMessage,
}

impl ValidationError {
    pub fn new(key: impl Into<String>, message: impl Into<ErrorMessage>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.key, self.message)
    }
}

/// Ordered accumulator of the errors raised during one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCollector {
    errors: Vec<ValidationError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single-message error for `key`.
    pub fn push(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .push(ValidationError::new(key, ErrorMessage::Single(message.into())));
    }

    /// Record the folded messages of a nested schema under `key`.
    pub fn push_nested(&mut self, key: impl Into<String>, messages: Vec<String>) {
        self.errors
            .push(ValidationError::new(key, ErrorMessage::Nested(messages)));
    }

    /// Returns the number of error records (not message lines).
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if the run raised no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flattened view: every message line, nested lists expanded one level.
    pub fn flattened(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|e| e.message.lines().map(str::to_string))
            .collect()
    }

    /// Grouped view: the `{key, message}` records in the order they were raised.
    pub fn grouped(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Records raised for `key`.
    pub fn for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.key == key)
    }

    /// Consumes self and returns the inner records.
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn message() -> impl Strategy<Value = ErrorMessage> {
        prop_oneof![
            "[a-z ]{0,20}".prop_map(ErrorMessage::Single),
            prop::collection::vec("[a-z ]{0,20}", 0..4).prop_map(ErrorMessage::Nested),
        ]
    }

    proptest! {
        #[test]
        fn flattened_has_one_entry_per_line(
            records in prop::collection::vec(("[a-d]", message()), 0..8),
        ) {
            let mut errors = ErrorCollector::new();
            for (key, message) in &records {
                match message {
                    ErrorMessage::Single(s) => errors.push(key.as_str(), s.as_str()),
                    ErrorMessage::Nested(v) => errors.push_nested(key.as_str(), v.clone()),
                }
            }

            let total: usize = records.iter().map(|(_, m)| m.lines().count()).sum();
            prop_assert_eq!(errors.flattened().len(), total);
            prop_assert_eq!(errors.len(), records.len());
            prop_assert_eq!(errors.into_inner().len(), records.len());
        }
    }
}
