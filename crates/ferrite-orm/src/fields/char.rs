//! Character/string field types.

use ferrite_core::Value;

use super::FieldOptions;

/// A character field with a maximum length (default 32).
#[derive(Debug, Clone)]
pub struct CharField {
    /// Maximum length in bytes.
    pub max_length: usize,
    /// Field options.
    pub options: FieldOptions,
}

impl CharField {
    /// Creates a new `CharField` with the given max length.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            options: FieldOptions::new(),
        }
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates a candidate value: text within the length bound, then the
    /// base rule.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Text(s) if s.len() > self.max_length => false,
            Value::Null | Value::Text(_) => self.options.accepts(value),
            _ => false,
        }
    }
}

impl Default for CharField {
    fn default() -> Self {
        Self::new(32)
    }
}

/// A long text field with a larger default bound (128).
#[derive(Debug, Clone)]
pub struct TextField {
    /// Maximum length in bytes.
    pub max_length: usize,
    /// Field options.
    pub options: FieldOptions,
}

impl TextField {
    /// Creates a new `TextField` with the default bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: 128,
            options: FieldOptions::new(),
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates a candidate value.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Text(s) if s.len() > self.max_length => false,
            Value::Null | Value::Text(_) => self.options.accepts(value),
            _ => false,
        }
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_field_length_bound() {
        let field = CharField::new(10);
        assert!(field.validate(&Value::Text("short".into())));
        assert!(!field.validate(&Value::Text("this is far too long".into())));
        // boundary: exactly the bound passes
        assert!(field.validate(&Value::Text("exactly_10".into())));
    }

    #[test]
    fn test_char_field_rejects_non_text() {
        let field = CharField::new(10);
        assert!(!field.validate(&Value::Int(5)));
        assert!(!field.validate(&Value::Null));
        assert!(field.options(FieldOptions::new().null(true)).validate(&Value::Null));
    }

    #[test]
    fn test_text_field_default_bound() {
        let field = TextField::new();
        assert!(field.validate(&Value::Text("a".repeat(128))));
        assert!(!field.validate(&Value::Text("a".repeat(129))));
    }
}
