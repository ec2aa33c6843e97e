//! Numeric field types, including the primary key.

use ferrite_core::Value;

use super::FieldOptions;

/// A numeric field: integers, floats, or text parsing as a number.
#[derive(Debug, Clone, Default)]
pub struct NumberField {
    /// Field options.
    pub options: FieldOptions,
}

impl NumberField {
    /// Creates a new `NumberField`.
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

    /// Validates a candidate value: numeric, then the base rule.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.options.accepts(value);
        }
        value.is_numeric() && self.options.accepts(value)
    }
}

/// The primary-key field. Never nullable, always numeric.
#[derive(Debug, Clone)]
pub struct PrimaryKeyField {
    /// Field options. `null` is forced to `false`.
    pub options: FieldOptions,
}

impl PrimaryKeyField {
    /// Creates a new `PrimaryKeyField`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: FieldOptions::new().null(false),
        }
    }

    /// Sets field options. Nullability stays forced off.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options.null(false);
        self
    }

    /// Validates a candidate value: numeric, never NULL.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        value.is_numeric() && self.options.accepts(value)
    }
}

impl Default for PrimaryKeyField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_field() {
        let field = NumberField::new();
        assert!(field.validate(&Value::Int(42)));
        assert!(field.validate(&Value::Float(4.2)));
        assert!(field.validate(&Value::Text("42".into())));
        assert!(!field.validate(&Value::Text("forty-two".into())));
        assert!(!field.validate(&Value::Null));
    }

    #[test]
    fn test_number_field_nullable() {
        let field = NumberField::new().options(FieldOptions::new().null(true));
        assert!(field.validate(&Value::Null));
    }

    #[test]
    fn test_primary_key_never_nullable() {
        let field = PrimaryKeyField::new().options(FieldOptions::new().null(true));
        assert!(!field.validate(&Value::Null));
        assert!(field.validate(&Value::Int(1)));
        assert!(!field.validate(&Value::Text("abc".into())));
    }
}
