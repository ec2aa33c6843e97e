//! Timestamp field.

use chrono::NaiveDateTime;
use ferrite_core::Value;

use super::FieldOptions;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A timestamp field accepting `YYYY-MM-DD HH:MM:SS` text.
#[derive(Debug, Clone, Default)]
pub struct DateTimeField {
    /// Field options.
    pub options: FieldOptions,
}

impl DateTimeField {
    /// Creates a new `DateTimeField`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates a candidate value: text matching the timestamp pattern,
    /// then the base rule.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.options.accepts(value),
            Value::Text(s) => {
                NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).is_ok()
                    && self.options.accepts(value)
            }
            _ => false,
        }
    }
}
