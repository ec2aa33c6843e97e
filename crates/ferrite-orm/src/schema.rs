//! Model schema: the table-shaped description of a model type.
//!
//! Models register their fields once through [`SchemaBuilder`] and memoize
//! the result in a `OnceLock`. Relationships reference other schemas through
//! [`SchemaRef`], a plain function pointer, so mutually-referencing models
//! stay declarable without initialization-order gymnastics.

use crate::error::UsageError;
use crate::fields::FieldKind;

/// Accessor for a model's schema. Relationship fields hold these instead of
/// direct references so schema construction never recurses eagerly.
pub type SchemaRef = fn() -> &'static ModelSchema;

/// One declared field, with its resolved storage column.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Declared property name.
    pub name: &'static str,
    /// Storage column, `None` for fields with no column of their own.
    pub column: Option<String>,
    /// The field descriptor.
    pub kind: FieldKind,
}

/// The complete schema of one model: its table, fields, and primary key.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    model: &'static str,
    table: String,
    fields: Vec<FieldDef>,
    pk: usize,
}

impl ModelSchema {
    /// Starts building a schema for the named model. The storage table
    /// defaults to the snake-cased model name.
    #[must_use]
    pub fn builder(model: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            model,
            table: None,
            fields: Vec::new(),
        }
    }

    /// The model name.
    #[must_use]
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// The storage table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The primary-key field.
    #[must_use]
    pub fn pk_def(&self) -> &FieldDef {
        &self.fields[self.pk]
    }

    /// The primary-key property name.
    #[must_use]
    pub fn pk_name(&self) -> &'static str {
        self.pk_def().name
    }

    /// The primary-key storage column.
    #[must_use]
    pub fn pk_column(&self) -> &str {
        // The builder guarantees the primary key resolves to a column.
        self.pk_def().column.as_deref().unwrap_or(self.pk_def().name)
    }

    /// Looks up a field by property name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up the field that owns the given storage column.
    #[must_use]
    pub fn field_for_column(&self, column: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.column.as_deref() == Some(column))
    }

    /// The storage column of a named field, when it has one.
    #[must_use]
    pub fn column_for(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|f| f.column.as_deref())
    }

    /// Every storage column of this model, in declaration order. This is
    /// the projection selected by queries.
    #[must_use]
    pub fn select_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| f.column.as_deref())
            .collect()
    }
}

/// Builder for [`ModelSchema`]. Rejects duplicate fields and enforces
/// exactly one primary key.
#[derive(Debug)]
pub struct SchemaBuilder {
    model: &'static str,
    table: Option<String>,
    fields: Vec<(&'static str, FieldKind)>,
}

impl SchemaBuilder {
    /// Overrides the storage table name.
    #[must_use]
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Registers a field under the given property name.
    #[must_use]
    pub fn field(mut self, name: &'static str, kind: impl Into<FieldKind>) -> Self {
        self.fields.push((name, kind.into()));
        self
    }

    /// Finalizes the schema, resolving storage columns.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::DuplicateField`] when a property name repeats,
    /// [`UsageError::NoPrimaryKey`] when no field is the primary key, and
    /// [`UsageError::MultiplePrimaryKeys`] when more than one is.
    pub fn build(self) -> Result<ModelSchema, UsageError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut pk: Option<usize> = None;

        for (index, (name, kind)) in self.fields.into_iter().enumerate() {
            if fields.iter().any(|f: &FieldDef| f.name == name) {
                return Err(UsageError::DuplicateField {
                    model: self.model.to_owned(),
                    field: name.to_owned(),
                });
            }
            if kind.is_primary_key() {
                if pk.is_some() {
                    return Err(UsageError::MultiplePrimaryKeys {
                        model: self.model.to_owned(),
                        field: name.to_owned(),
                    });
                }
                pk = Some(index);
            }
            let column = resolve_column(name, &kind);
            fields.push(FieldDef { name, column, kind });
        }

        let Some(pk) = pk else {
            return Err(UsageError::NoPrimaryKey {
                model: self.model.to_owned(),
            });
        };

        Ok(ModelSchema {
            model: self.model,
            table: self.table.unwrap_or_else(|| snake_case(self.model)),
            fields,
            pk,
        })
    }
}

/// Resolves the storage column of one field: explicit `db_column` wins,
/// forward relationships default to `{name}_{target_pk}`, everything else
/// uses the property name. Fields with no column resolve to `None`.
fn resolve_column(name: &str, kind: &FieldKind) -> Option<String> {
    if !kind.has_column() {
        return None;
    }
    if let Some(column) = &kind.options().db_column {
        return Some(column.clone());
    }
    if kind.is_forward() {
        if let Some(target) = kind.target() {
            return Some(format!("{name}_{}", target().pk_column()));
        }
    }
    Some(name.to_owned())
}

/// Converts a CamelCase model name to the snake_case table default.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
