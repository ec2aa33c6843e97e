//! Relationship field types.
//!
//! Forward relationships (belongs-to, has-one) occupy a foreign-key column
//! on the owning table. Many-to-many and reverse relationships occupy no
//! column: the former is junction metadata, the latter materializes as a
//! QuerySet over the child model.

use ferrite_core::Value;

use super::FieldOptions;
use crate::schema::SchemaRef;

/// A belongs-to relationship referencing another model.
#[derive(Debug, Clone)]
pub struct ForeignKeyField {
    /// Accessor for the target model's schema.
    pub target: SchemaRef,
    /// Field options.
    pub options: FieldOptions,
}

impl ForeignKeyField {
    /// Creates a foreign key to the given target model.
    #[must_use]
    pub fn new(target: SchemaRef) -> Self {
        Self {
            target,
            options: FieldOptions::new(),
        }
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the stored column value: NULL per nullability, or a
    /// resolved target primary key. The instance-type check lives in the
    /// typed accessors.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.options.null,
            Value::Int(_) => true,
            _ => false,
        }
    }
}

/// A has-one relationship. Stored and validated like a foreign key.
#[derive(Debug, Clone)]
pub struct HasOneField {
    /// Accessor for the target model's schema.
    pub target: SchemaRef,
    /// Field options.
    pub options: FieldOptions,
}

impl HasOneField {
    /// Creates a has-one relationship to the given target model.
    #[must_use]
    pub fn new(target: SchemaRef) -> Self {
        Self {
            target,
            options: FieldOptions::new(),
        }
    }

    /// Sets field options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the stored column value.
    #[must_use]
    pub fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.options.null,
            Value::Int(_) => true,
            _ => false,
        }
    }
}

/// A many-to-many relationship through a junction model.
///
/// Carries schema metadata only; there is no storage column and no direct
/// value. Type checks against the target happen in the typed accessors.
#[derive(Debug, Clone)]
pub struct ManyToManyField {
    /// Accessor for the target model's schema.
    pub target: SchemaRef,
    /// Accessor for the junction model's schema.
    pub through: SchemaRef,
    /// Field options.
    pub options: FieldOptions,
}

impl ManyToManyField {
    /// Creates a many-to-many relationship.
    #[must_use]
    pub fn new(target: SchemaRef, through: SchemaRef) -> Self {
        Self {
            target,
            through,
            options: FieldOptions::new(),
        }
    }
}

/// The reverse side of a foreign key declared on another model.
///
/// Reads materialize as an unexecuted QuerySet over the child model,
/// pre-filtered on the child's foreign key pointing back at the owner.
#[derive(Debug, Clone)]
pub struct ReverseField {
    /// Accessor for the child model's schema.
    pub child: SchemaRef,
    /// Name of the foreign-key field on the child that points back.
    pub foreign_key: &'static str,
    /// Field options.
    pub options: FieldOptions,
}

impl ReverseField {
    /// Creates a reverse relationship.
    #[must_use]
    pub fn new(child: SchemaRef, foreign_key: &'static str) -> Self {
        Self {
            child,
            foreign_key,
            options: FieldOptions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelSchema;
    use std::sync::OnceLock;

    fn target_schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ModelSchema::builder("Target")
                .field("id", crate::fields::PrimaryKeyField::new())
                .build()
                .expect("target schema")
        })
    }

    #[test]
    fn test_foreign_key_column_values() {
        let field = ForeignKeyField::new(target_schema);
        assert!(field.validate(&Value::Int(3)));
        assert!(!field.validate(&Value::Null));
        assert!(!field.validate(&Value::Text("3".into())));

        let nullable = ForeignKeyField::new(target_schema).options(FieldOptions::new().null(true));
        assert!(nullable.validate(&Value::Null));
    }
}
