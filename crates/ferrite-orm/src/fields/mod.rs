//! Field types for model definitions.
//!
//! Every declared model property carries exactly one field descriptor. A
//! descriptor is immutable configuration: validation is a pure function of
//! the descriptor and the candidate value, communicated purely through a
//! boolean result. Turning `false` into a surfaced error is the model's job.

mod char;
mod json;
mod numeric;
mod relations;
mod temporal;

pub use self::char::{CharField, TextField};
pub use json::JsonField;
pub use numeric::{NumberField, PrimaryKeyField};
pub use relations::{ForeignKeyField, HasOneField, ManyToManyField, ReverseField};
pub use temporal::DateTimeField;

use ferrite_core::Value;

use crate::schema::SchemaRef;

/// Common field options.
#[derive(Debug, Clone)]
pub struct FieldOptions {
    /// Whether NULL is an acceptable value.
    pub null: bool,
    /// Whether the empty string is an acceptable value.
    pub blank: bool,
    /// Allowed values; empty means unrestricted.
    pub choices: Vec<Value>,
    /// Column-name override; resolved during schema build when absent.
    pub db_column: Option<String>,
    /// Default value.
    pub default: Option<Value>,
    /// Uniqueness intent (enforced by the storage schema, not the core).
    pub unique: bool,
    /// Custom validator predicates, checked in order.
    pub validators: Vec<fn(&Value) -> bool>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            null: false,
            blank: true,
            choices: Vec::new(),
            db_column: None,
            default: None,
            unique: false,
            validators: Vec::new(),
        }
    }
}

impl FieldOptions {
    /// Creates options with defaults: not nullable, blank allowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether NULL is acceptable.
    #[must_use]
    pub fn null(mut self, value: bool) -> Self {
        self.null = value;
        self
    }

    /// Sets whether the empty string is acceptable.
    #[must_use]
    pub fn blank(mut self, value: bool) -> Self {
        self.blank = value;
        self
    }

    /// Restricts the field to the given values.
    #[must_use]
    pub fn choices(mut self, values: Vec<Value>) -> Self {
        self.choices = values;
        self
    }

    /// Overrides the storage column name.
    #[must_use]
    pub fn db_column(mut self, column: impl Into<String>) -> Self {
        self.db_column = Some(column.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the field unique.
    #[must_use]
    pub fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Appends a custom validator predicate.
    #[must_use]
    pub fn validator(mut self, check: fn(&Value) -> bool) -> Self {
        self.validators.push(check);
        self
    }

    /// The base acceptance rule shared by every field variant.
    ///
    /// NULL is decided solely by `null`. Otherwise: empty text requires
    /// `blank`, non-empty `choices` require membership, and every custom
    /// validator must pass.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.null;
        }
        if let Value::Text(s) = value {
            if s.is_empty() && !self.blank {
                return false;
            }
        }
        if !self.choices.is_empty() && !self.choices.contains(value) {
            return false;
        }
        self.validators.iter().all(|check| check(value))
    }
}

/// A field descriptor attached to one declared model property.
///
/// Exactly one kind per property; registering two is a schema error.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Character field with a maximum length.
    Char(CharField),
    /// Long text field.
    Text(TextField),
    /// Numeric field.
    Number(NumberField),
    /// Timestamp field, `YYYY-MM-DD HH:MM:SS`.
    DateTime(DateTimeField),
    /// JSON object/array field.
    Json(JsonField),
    /// The primary key.
    PrimaryKey(PrimaryKeyField),
    /// Belongs-to relationship; stored as a foreign-key column.
    ForeignKey(ForeignKeyField),
    /// Has-one relationship; stored as a foreign-key column.
    HasOne(HasOneField),
    /// Many-to-many relationship through a junction model.
    ManyToMany(ManyToManyField),
    /// Reverse side of a foreign key on another model.
    Reverse(ReverseField),
}

impl FieldKind {
    /// Validates a candidate value against this descriptor.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match self {
            Self::Char(f) => f.validate(value),
            Self::Text(f) => f.validate(value),
            Self::Number(f) => f.validate(value),
            Self::DateTime(f) => f.validate(value),
            Self::Json(f) => f.validate(value),
            Self::PrimaryKey(f) => f.validate(value),
            Self::ForeignKey(f) => f.validate(value),
            Self::HasOne(f) => f.validate(value),
            // Instance-typed checks happen in the typed accessors; a bare
            // value never reaches a many-to-many or reverse slot.
            Self::ManyToMany(_) | Self::Reverse(_) => true,
        }
    }

    /// Returns the shared options of this descriptor.
    #[must_use]
    pub fn options(&self) -> &FieldOptions {
        match self {
            Self::Char(f) => &f.options,
            Self::Text(f) => &f.options,
            Self::Number(f) => &f.options,
            Self::DateTime(f) => &f.options,
            Self::Json(f) => &f.options,
            Self::PrimaryKey(f) => &f.options,
            Self::ForeignKey(f) => &f.options,
            Self::HasOne(f) => &f.options,
            Self::ManyToMany(f) => &f.options,
            Self::Reverse(f) => &f.options,
        }
    }

    /// Whether this is the primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        matches!(self, Self::PrimaryKey(_))
    }

    /// Whether this is a forward relationship (stored as a column).
    #[must_use]
    pub const fn is_forward(&self) -> bool {
        matches!(self, Self::ForeignKey(_) | Self::HasOne(_))
    }

    /// Whether this is a reverse relationship (no storage column).
    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        matches!(self, Self::Reverse(_))
    }

    /// Whether this is a many-to-many relationship (no storage column).
    #[must_use]
    pub const fn is_many_to_many(&self) -> bool {
        matches!(self, Self::ManyToMany(_))
    }

    /// Whether this field occupies a column on the owning table.
    #[must_use]
    pub const fn has_column(&self) -> bool {
        !matches!(self, Self::ManyToMany(_) | Self::Reverse(_))
    }

    /// Returns the target schema of a forward or many-to-many relationship.
    #[must_use]
    pub fn target(&self) -> Option<SchemaRef> {
        match self {
            Self::ForeignKey(f) => Some(f.target),
            Self::HasOne(f) => Some(f.target),
            Self::ManyToMany(f) => Some(f.target),
            _ => None,
        }
    }
}

impl From<CharField> for FieldKind {
    fn from(f: CharField) -> Self {
        Self::Char(f)
    }
}

impl From<TextField> for FieldKind {
    fn from(f: TextField) -> Self {
        Self::Text(f)
    }
}

impl From<NumberField> for FieldKind {
    fn from(f: NumberField) -> Self {
        Self::Number(f)
    }
}

impl From<DateTimeField> for FieldKind {
    fn from(f: DateTimeField) -> Self {
        Self::DateTime(f)
    }
}

impl From<JsonField> for FieldKind {
    fn from(f: JsonField) -> Self {
        Self::Json(f)
    }
}

impl From<PrimaryKeyField> for FieldKind {
    fn from(f: PrimaryKeyField) -> Self {
        Self::PrimaryKey(f)
    }
}

impl From<ForeignKeyField> for FieldKind {
    fn from(f: ForeignKeyField) -> Self {
        Self::ForeignKey(f)
    }
}

impl From<HasOneField> for FieldKind {
    fn from(f: HasOneField) -> Self {
        Self::HasOne(f)
    }
}

impl From<ManyToManyField> for FieldKind {
    fn from(f: ManyToManyField) -> Self {
        Self::ManyToMany(f)
    }
}

impl From<ReverseField> for FieldKind {
    fn from(f: ReverseField) -> Self {
        Self::Reverse(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handling() {
        let strict = FieldOptions::new();
        assert!(!strict.accepts(&Value::Null));

        let lax = FieldOptions::new().null(true);
        assert!(lax.accepts(&Value::Null));
    }

    #[test]
    fn test_blank_handling() {
        let lax = FieldOptions::new();
        assert!(lax.accepts(&Value::Text(String::new())));

        let strict = FieldOptions::new().blank(false);
        assert!(!strict.accepts(&Value::Text(String::new())));
        assert!(strict.accepts(&Value::Text("x".into())));
    }

    #[test]
    fn test_choices() {
        let opts = FieldOptions::new().choices(vec![Value::Int(1), Value::Int(2)]);
        assert!(opts.accepts(&Value::Int(1)));
        assert!(!opts.accepts(&Value::Int(3)));
    }

    #[test]
    fn test_custom_validators() {
        fn positive(v: &Value) -> bool {
            v.as_i64().is_some_and(|n| n > 0)
        }
        let opts = FieldOptions::new().validator(positive);
        assert!(opts.accepts(&Value::Int(5)));
        assert!(!opts.accepts(&Value::Int(-5)));
    }
}
