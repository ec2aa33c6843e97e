//! The per-model query entry point.

use std::marker::PhantomData;

use ferrite_core::Connection;

use crate::error::Result;
use crate::model::{Instance, Model};
use crate::queryset::{IntoLookups, QuerySet};

/// Hands out QuerySets for model `M`. Obtained through
/// [`Model::objects`]; carries no state of its own.
pub struct Manager<M: Model> {
    _marker: PhantomData<M>,
}

impl<M: Model> Manager<M> {
    /// Creates a manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// An unfiltered QuerySet over every row of the model's table.
    #[must_use]
    pub fn all(self) -> QuerySet<M> {
        QuerySet::new()
    }

    /// A QuerySet restricted by the given lookups.
    ///
    /// # Errors
    ///
    /// Returns a lookup-parse error for an invalid expression.
    pub fn filter(self, lookups: impl IntoLookups) -> Result<QuerySet<M>> {
        QuerySet::new().filter(lookups)
    }

    /// A QuerySet excluding rows matching the given lookups.
    ///
    /// # Errors
    ///
    /// Returns a lookup-parse error for an invalid expression.
    pub fn exclude(self, lookups: impl IntoLookups) -> Result<QuerySet<M>> {
        QuerySet::new().exclude(lookups)
    }

    /// An unfiltered QuerySet ordered by the given fields.
    ///
    /// # Errors
    ///
    /// Returns a lookup-parse error for an invalid field expression.
    pub fn order_by(self, fields: &[&str]) -> Result<QuerySet<M>> {
        QuerySet::new().order_by(fields)
    }

    /// An unfiltered QuerySet grouped by the given fields.
    ///
    /// # Errors
    ///
    /// Returns a lookup-parse error for an invalid field expression.
    pub fn group_by(self, fields: &[&str]) -> Result<QuerySet<M>> {
        QuerySet::new().group_by(fields)
    }

    /// Fetches the single row with the given primary key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OrmError::MultipleResults`] if more than one row
    /// matches, plus storage errors.
    pub fn get(self, conn: &mut dyn Connection, pk: i64) -> Result<Option<Instance<M>>> {
        self.filter([(M::schema().pk_name(), pk)])?.get(conn)
    }

    /// Fetches the single row matching the given lookups.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OrmError::MultipleResults`] if more than one row
    /// matches, plus lookup-parse and storage errors.
    pub fn get_with(
        self,
        conn: &mut dyn Connection,
        lookups: impl IntoLookups,
    ) -> Result<Option<Instance<M>>> {
        self.filter(lookups)?.get(conn)
    }
}

impl<M: Model> Default for Manager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Clone for Manager<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Model> Copy for Manager<M> {}
