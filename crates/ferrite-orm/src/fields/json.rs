//! Structured JSON field.

use ferrite_core::Value;

use super::FieldOptions;

/// A field holding a JSON object or array, stored as text.
#[derive(Debug, Clone, Default)]
pub struct JsonField {
    /// Field options.
    pub options: FieldOptions,
}

impl JsonField {
    /// Creates a new `JsonField`.
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

    /// Validates a candidate value: text parsing as a JSON object or
    /// array, then the base rule. Scalar JSON documents are rejected.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.options.accepts(value),
            Value::Text(s) => match serde_json::from_str::<serde_json::Value>(s) {
                Ok(doc) => (doc.is_object() || doc.is_array()) && self.options.accepts(value),
                Err(_) => false,
            },
            _ => false,
        }
    }
}
