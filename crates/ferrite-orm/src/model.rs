//! The model trait and the live instance type.
//!
//! A model type is a unit struct implementing [`Model`]: it names its
//! schema and hands out a [`Manager`](crate::Manager) through `objects()`.
//! Row data lives in [`Instance`], which tracks edited fields so `save`
//! writes only what changed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;

use ferrite_core::{Connection, Row, ToValue, Value};
use tracing::debug;

use crate::error::{OrmError, Result, UsageError};
use crate::fields::FieldKind;
use crate::manager::Manager;
use crate::queryset::QuerySet;
use crate::schema::ModelSchema;

/// A persistable model type.
pub trait Model: Sized + 'static {
    /// The memoized schema of this model.
    fn schema() -> &'static ModelSchema;

    /// Entry point for queries over this model.
    #[must_use]
    fn objects() -> Manager<Self> {
        Manager::new()
    }
}

const NULL: Value = Value::Null;

/// A live row of model `M`.
///
/// Field access is by property name, checked against the schema. Writes
/// validate through the field descriptor and mark the field edited; loads
/// from storage bypass validation and reset the edited set.
pub struct Instance<M: Model> {
    values: HashMap<&'static str, Value>,
    edited: BTreeSet<&'static str>,
    _marker: PhantomData<M>,
}

impl<M: Model> Clone for Instance<M> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            edited: self.edited.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Instance<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &M::schema().model())
            .field("values", &self.values)
            .field("edited", &self.edited)
            .finish()
    }
}

impl<M: Model> fmt::Display for Instance<M> {
    /// Renders the model name and every column-backed field value, in
    /// declaration order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", M::schema().model())?;
        let mut first = true;
        for field in M::schema().fields() {
            if !field.kind.has_column() {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            let value = self.values.get(field.name).unwrap_or(&NULL);
            write!(f, "{}: {}", field.name, value.to_plain_string())?;
        }
        write!(f, ")")
    }
}

impl<M: Model> Default for Instance<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// An instance used as a filter value binds as its primary key.
impl<M: Model> ToValue for &Instance<M> {
    fn to_value(self) -> Value {
        self.pk().map_or(Value::Null, Value::Int)
    }
}

impl<M: Model> Instance<M> {
    /// Creates an unsaved instance. Declared defaults are applied and
    /// marked edited so the first `save` persists them.
    #[must_use]
    pub fn new() -> Self {
        let mut instance = Self {
            values: HashMap::new(),
            edited: BTreeSet::new(),
            _marker: PhantomData,
        };
        for field in M::schema().fields() {
            if let Some(default) = &field.kind.options().default {
                instance.values.insert(field.name, default.clone());
                instance.edited.insert(field.name);
            }
        }
        instance
    }

    fn field_not_found(name: &str) -> OrmError {
        UsageError::FieldNotFound {
            model: M::schema().model().to_owned(),
            field: name.to_owned(),
        }
        .into()
    }

    fn invalid_field(name: &str) -> OrmError {
        OrmError::InvalidField {
            model: M::schema().model().to_owned(),
            field: name.to_owned(),
        }
    }

    /// Reads a field value. Unset fields read as NULL.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::FieldNotFound`] for an undeclared name.
    pub fn get(&self, name: &str) -> Result<&Value> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        if !field.kind.has_column() {
            return Err(Self::field_not_found(name));
        }
        Ok(self.values.get(field.name).unwrap_or(&NULL))
    }

    /// Writes a field value, validating through the field descriptor.
    ///
    /// Plain fields validate and mark themselves edited. Writing an
    /// integer to a relationship field verifies the referenced row exists,
    /// which is why a connection is required. The primary key stores
    /// directly without joining the edited set.
    ///
    /// # Errors
    ///
    /// [`UsageError::FieldNotFound`] for an undeclared name,
    /// [`OrmError::InvalidField`] when validation rejects the value,
    /// [`OrmError::TypeMismatch`] when a relationship receives a
    /// non-integer, and [`OrmError::UnresolvedForeignKey`] when the
    /// referenced row does not exist.
    pub fn set(&mut self, name: &str, value: Value, conn: &mut dyn Connection) -> Result<()> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        match &field.kind {
            // Stored directly, unvalidated: this is the hydration path and
            // the key never joins the edited set.
            FieldKind::PrimaryKey(_) => {
                self.values.insert(field.name, value);
                Ok(())
            }
            FieldKind::ForeignKey(_) | FieldKind::HasOne(_) => match value {
                Value::Null => {
                    if !field.kind.validate(&Value::Null) {
                        return Err(Self::invalid_field(name));
                    }
                    self.values.insert(field.name, Value::Null);
                    self.edited.insert(field.name);
                    Ok(())
                }
                Value::Int(pk) => self.set_related_pk(name, pk, conn),
                other => {
                    let target = field
                        .kind
                        .target()
                        .map(|t| t().model())
                        .unwrap_or_default();
                    Err(OrmError::TypeMismatch {
                        expected: target.to_owned(),
                        got: other.type_name().to_owned(),
                    })
                }
            },
            FieldKind::ManyToMany(_) | FieldKind::Reverse(_) => Err(Self::field_not_found(name)),
            _ => {
                if !field.kind.validate(&value) {
                    return Err(Self::invalid_field(name));
                }
                self.values.insert(field.name, value);
                self.edited.insert(field.name);
                Ok(())
            }
        }
    }

    /// Points a relationship field at the row with the given primary key,
    /// after verifying that row exists.
    ///
    /// # Errors
    ///
    /// [`OrmError::UnresolvedForeignKey`] when no such row exists, plus
    /// the errors of [`Instance::set`] for bad names.
    pub fn set_related_pk(
        &mut self,
        name: &str,
        pk: i64,
        conn: &mut dyn Connection,
    ) -> Result<()> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        let target = match field.kind.target() {
            Some(target) if field.kind.is_forward() => target(),
            _ => return Err(Self::field_not_found(name)),
        };

        let sql = format!(
            "SELECT {pk_col} FROM {table} WHERE {pk_col} = ?",
            pk_col = target.pk_column(),
            table = target.table(),
        );
        debug!(target: "ferrite::model", %sql, "resolve foreign key");
        let result = conn.execute(&sql, &[Value::Int(pk)]).map_err(OrmError::from)?;
        let mut rows = result.into_rows();
        if rows.next().transpose().map_err(OrmError::from)?.is_none() {
            return Err(OrmError::UnresolvedForeignKey {
                model: target.model().to_owned(),
                pk,
            });
        }

        self.values.insert(field.name, Value::Int(pk));
        self.edited.insert(field.name);
        Ok(())
    }

    /// Points a relationship field at an already-saved instance of the
    /// declared target model. No existence check is needed.
    ///
    /// # Errors
    ///
    /// [`OrmError::TypeMismatch`] when `T` is not the declared target,
    /// [`OrmError::InvalidField`] when `other` has no primary key yet.
    pub fn set_related<T: Model>(&mut self, name: &str, other: &Instance<T>) -> Result<()> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        let target = match field.kind.target() {
            Some(target) if field.kind.is_forward() => target(),
            _ => return Err(Self::field_not_found(name)),
        };
        if !std::ptr::eq(target, T::schema()) {
            return Err(OrmError::TypeMismatch {
                expected: target.model().to_owned(),
                got: T::schema().model().to_owned(),
            });
        }
        let Some(pk) = other.pk() else {
            return Err(Self::invalid_field(name));
        };
        self.values.insert(field.name, Value::Int(pk));
        self.edited.insert(field.name);
        Ok(())
    }

    /// Fetches the instance a relationship field points at, or `None` when
    /// the field is NULL.
    ///
    /// # Errors
    ///
    /// [`OrmError::TypeMismatch`] when `T` is not the declared target,
    /// plus storage errors from the fetch.
    pub fn related<T: Model>(
        &self,
        name: &str,
        conn: &mut dyn Connection,
    ) -> Result<Option<Instance<T>>> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        let target = match field.kind.target() {
            Some(target) if field.kind.is_forward() => target(),
            _ => return Err(Self::field_not_found(name)),
        };
        if !std::ptr::eq(target, T::schema()) {
            return Err(OrmError::TypeMismatch {
                expected: target.model().to_owned(),
                got: T::schema().model().to_owned(),
            });
        }
        match self.values.get(field.name) {
            Some(Value::Int(pk)) => T::objects().get(conn, *pk),
            _ => Ok(None),
        }
    }

    /// Returns the unexecuted QuerySet behind a reverse relationship:
    /// every `T` row whose foreign key points back at this instance.
    ///
    /// # Errors
    ///
    /// [`OrmError::TypeMismatch`] when `T` is not the declared child
    /// model, [`UsageError::FieldNotFound`] for an undeclared name.
    pub fn reverse<T: Model>(&self, name: &str) -> Result<QuerySet<T>> {
        let field = M::schema().field(name).ok_or_else(|| Self::field_not_found(name))?;
        let FieldKind::Reverse(rev) = &field.kind else {
            return Err(Self::field_not_found(name));
        };
        let child = (rev.child)();
        if !std::ptr::eq(child, T::schema()) {
            return Err(OrmError::TypeMismatch {
                expected: child.model().to_owned(),
                got: T::schema().model().to_owned(),
            });
        }
        // An unsaved owner has no children: NULL never compares equal.
        let pk = self.pk().map_or(Value::Null, Value::Int);
        T::objects().filter([(rev.foreign_key, pk)])
    }

    /// The primary key, when assigned.
    #[must_use]
    pub fn pk(&self) -> Option<i64> {
        self.values.get(M::schema().pk_name()).and_then(Value::as_i64)
    }

    /// The raw primary-key value. NULL when unassigned.
    #[must_use]
    pub fn pk_value(&self) -> &Value {
        self.values.get(M::schema().pk_name()).unwrap_or(&NULL)
    }

    /// Names of fields edited since the last load or save.
    #[must_use]
    pub fn edited(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.edited.iter().copied()
    }

    /// Clears the edited set without persisting.
    pub fn clear_edited(&mut self) {
        self.edited.clear();
    }

    /// Hydrates an instance from a storage row. Columns map back to field
    /// names through the schema; unknown columns are ignored. Bypasses
    /// validation and leaves the edited set empty.
    pub(crate) fn from_row(row: &Row) -> Self {
        let mut values = HashMap::new();
        for (column, value) in row.iter() {
            if let Some(field) = M::schema().field_for_column(column) {
                values.insert(field.name, value.clone());
            }
        }
        Self {
            values,
            edited: BTreeSet::new(),
            _marker: PhantomData,
        }
    }

    /// Persists edited fields: an UPDATE when the primary key is set, an
    /// INSERT otherwise. Saving an already-persisted instance with nothing
    /// edited is a no-op and issues no statement. After an INSERT the
    /// primary key is taken from the storage result.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn save(&mut self, conn: &mut dyn Connection) -> Result<()> {
        let schema = M::schema();
        let pk = self.pk();

        if pk.is_some() && self.edited.is_empty() {
            debug!(target: "ferrite::model", model = schema.model(), "clean save skipped");
            return Ok(());
        }

        let mut columns = Vec::with_capacity(self.edited.len());
        let mut params = Vec::with_capacity(self.edited.len() + 1);
        for name in &self.edited {
            if let Some(column) = schema.column_for(name) {
                columns.push(column.to_owned());
                params.push(self.values.get(name).cloned().unwrap_or(Value::Null));
            }
        }

        if let Some(pk) = pk {
            let assignments = columns
                .iter()
                .map(|c| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {table} SET {assignments} WHERE {pk_col} = ?",
                table = schema.table(),
                pk_col = schema.pk_column(),
            );
            params.push(Value::Int(pk));
            debug!(target: "ferrite::model", %sql, params = params.len(), "update");
            conn.execute(&sql, &params).map_err(OrmError::from)?;
        } else {
            let sql = if columns.is_empty() {
                format!("INSERT INTO {} DEFAULT VALUES", schema.table())
            } else {
                format!(
                    "INSERT INTO {table} ({columns}) VALUES ({placeholders})",
                    table = schema.table(),
                    columns = columns.join(", "),
                    placeholders = vec!["?"; columns.len()].join(", "),
                )
            };
            debug!(target: "ferrite::model", %sql, params = params.len(), "insert");
            let result = conn.execute(&sql, &params).map_err(OrmError::from)?;
            if let Some(id) = result.last_insert_id() {
                self.values.insert(schema.pk_name(), Value::Int(id));
            }
        }

        self.edited.clear();
        Ok(())
    }

    /// Deletes the stored row and unassigns the primary key. An unsaved
    /// instance deletes nothing and issues no statement.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn delete(&mut self, conn: &mut dyn Connection) -> Result<u64> {
        let schema = M::schema();
        let Some(pk) = self.pk() else {
            return Ok(0);
        };
        let sql = format!(
            "DELETE FROM {table} WHERE {pk_col} = ?",
            table = schema.table(),
            pk_col = schema.pk_column(),
        );
        debug!(target: "ferrite::model", %sql, "delete");
        let result = conn.execute(&sql, &[Value::Int(pk)]).map_err(OrmError::from)?;
        self.values.remove(schema.pk_name());
        Ok(result.affected_rows())
    }
}
