//! The lazy, composable query set.
//!
//! A `QuerySet` accumulates filter nodes and modifiers without touching
//! storage. [`QuerySet::execute`] compiles and runs the SELECT exactly
//! once; results stream through [`QuerySet::try_next`] or the `Iterator`
//! impl and land in a primary-key-indexed cache. Mutating a set after
//! execution is an error, so a cached result can never silently disagree
//! with its filters.

use std::collections::HashMap;
use std::fmt;

use ferrite_core::{Connection, Rows, ToValue, Value};
use tracing::debug;

use crate::error::{OrmError, Result, UsageError};
use crate::model::{Instance, Model};
use crate::query::filter::{render, Combinator, FilterNode, Predicate};
use crate::query::lookup::{self, JoinHop};

/// Conversion into `(lookup expression, bind value)` pairs. Implemented
/// for single pairs, arrays, and vectors so call sites stay terse.
pub trait IntoLookups {
    /// The pairs, in call order.
    fn into_lookups(self) -> Vec<(String, Value)>;
}

impl<V: ToValue> IntoLookups for (&str, V) {
    fn into_lookups(self) -> Vec<(String, Value)> {
        vec![(self.0.to_owned(), self.1.to_value())]
    }
}

impl<V: ToValue, const N: usize> IntoLookups for [(&str, V); N] {
    fn into_lookups(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_value()))
            .collect()
    }
}

impl<V: ToValue> IntoLookups for Vec<(&str, V)> {
    fn into_lookups(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_value()))
            .collect()
    }
}

/// A lazy query over model `M`.
pub struct QuerySet<M: Model> {
    filters: Vec<FilterNode>,
    group_by: Option<Vec<String>>,
    order_by: Option<Vec<String>>,
    // Joins required by group/order expressions, kept apart from the
    // joins the filter tree contributes at render time.
    modifier_joins: Vec<JoinHop>,
    executed: bool,
    cursor: Option<Rows>,
    cache: Vec<Instance<M>>,
    by_pk: HashMap<i64, usize>,
    poisoned: bool,
}

impl<M: Model> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("model", &M::schema().model())
            .field("filters", &self.filters)
            .field("group_by", &self.group_by)
            .field("order_by", &self.order_by)
            .field("executed", &self.executed)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<M: Model> Default for QuerySet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> QuerySet<M> {
    /// Creates an empty, unexecuted set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            group_by: None,
            order_by: None,
            modifier_joins: Vec::new(),
            executed: false,
            cursor: None,
            cache: Vec::new(),
            by_pk: HashMap::new(),
            poisoned: false,
        }
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.executed {
            return Err(UsageError::AlreadyExecuted.into());
        }
        Ok(())
    }

    fn push_node(&mut self, combinator: Combinator, lookups: impl IntoLookups) -> Result<()> {
        self.ensure_pending()?;
        let mut predicates = Vec::new();
        for (expr, value) in lookups.into_lookups() {
            let lookup = lookup::parse(M::schema(), &expr)?;
            let value = lookup.op.transform(value);
            predicates.push(Predicate { lookup, value });
        }
        self.filters.push(FilterNode::Atomic {
            combinator,
            predicates,
        });
        Ok(())
    }

    fn push_group(mut self, combinator: Combinator, other: Self) -> Result<Self> {
        self.ensure_pending()?;
        other.ensure_pending()?;
        self.filters.push(FilterNode::Group {
            combinator,
            nodes: other.filters,
        });
        Ok(self)
    }

    /// Adds a conjunction of lookups.
    ///
    /// # Errors
    ///
    /// [`UsageError::InvalidLookup`] for a bad expression,
    /// [`UsageError::AlreadyExecuted`] after execution.
    pub fn filter(mut self, lookups: impl IntoLookups) -> Result<Self> {
        self.push_node(Combinator::And, lookups)?;
        Ok(self)
    }

    /// Alias for [`QuerySet::filter`], reading better in chains.
    ///
    /// # Errors
    ///
    /// Same as `filter`.
    pub fn and(self, lookups: impl IntoLookups) -> Result<Self> {
        self.filter(lookups)
    }

    /// Adds a disjunction: rows matching the lookups are admitted even
    /// when earlier nodes reject them.
    ///
    /// # Errors
    ///
    /// Same as `filter`.
    pub fn or(mut self, lookups: impl IntoLookups) -> Result<Self> {
        self.push_node(Combinator::Or, lookups)?;
        Ok(self)
    }

    /// Adds an exclusive disjunction.
    ///
    /// # Errors
    ///
    /// Same as `filter`.
    pub fn xor(mut self, lookups: impl IntoLookups) -> Result<Self> {
        self.push_node(Combinator::Xor, lookups)?;
        Ok(self)
    }

    /// Excludes rows matching the lookups. As the first node this renders
    /// a leading `NOT`.
    ///
    /// # Errors
    ///
    /// Same as `filter`.
    pub fn exclude(mut self, lookups: impl IntoLookups) -> Result<Self> {
        self.push_node(Combinator::AndNot, lookups)?;
        Ok(self)
    }

    /// Attaches another set's filter tree as a parenthesized conjunct.
    ///
    /// # Errors
    ///
    /// [`UsageError::AlreadyExecuted`] when either set has executed.
    pub fn and_query(self, other: Self) -> Result<Self> {
        self.push_group(Combinator::And, other)
    }

    /// Attaches another set's filter tree as a parenthesized disjunct.
    ///
    /// # Errors
    ///
    /// Same as [`QuerySet::and_query`].
    pub fn or_query(self, other: Self) -> Result<Self> {
        self.push_group(Combinator::Or, other)
    }

    /// Attaches another set's filter tree with exclusive disjunction.
    ///
    /// # Errors
    ///
    /// Same as [`QuerySet::and_query`].
    pub fn xor_query(self, other: Self) -> Result<Self> {
        self.push_group(Combinator::Xor, other)
    }

    /// Attaches another set's filter tree negated.
    ///
    /// # Errors
    ///
    /// Same as [`QuerySet::and_query`].
    pub fn exclude_query(self, other: Self) -> Result<Self> {
        self.push_group(Combinator::AndNot, other)
    }

    /// Drops every accumulated filter, widening the set back to the whole
    /// table. Modifiers are kept.
    ///
    /// # Errors
    ///
    /// [`UsageError::AlreadyExecuted`] after execution.
    pub fn all(mut self) -> Result<Self> {
        self.ensure_pending()?;
        self.filters.clear();
        Ok(self)
    }

    fn resolve_modifier(&mut self, expr: &str) -> Result<String> {
        let (expr, suffix) = match expr.strip_prefix('-') {
            Some(rest) => (rest, " DESC"),
            None => (expr, ""),
        };
        let lookup = lookup::parse(M::schema(), expr)?;
        for hop in lookup.joins {
            if !self.modifier_joins.contains(&hop) {
                self.modifier_joins.push(hop);
            }
        }
        Ok(format!("{}.{}{suffix}", lookup.table, lookup.column))
    }

    /// Sets the GROUP BY fields. May be called at most once per set.
    ///
    /// # Errors
    ///
    /// [`UsageError::DuplicateModifier`] on a second call,
    /// [`UsageError::InvalidLookup`] for a bad expression,
    /// [`UsageError::AlreadyExecuted`] after execution.
    pub fn group_by(mut self, fields: &[&str]) -> Result<Self> {
        self.ensure_pending()?;
        if self.group_by.is_some() {
            return Err(UsageError::DuplicateModifier { clause: "GROUP BY" }.into());
        }
        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            resolved.push(self.resolve_modifier(field)?);
        }
        self.group_by = Some(resolved);
        Ok(self)
    }

    /// Sets the ORDER BY fields. A leading `-` orders descending. May be
    /// called at most once per set.
    ///
    /// # Errors
    ///
    /// Same as [`QuerySet::group_by`].
    pub fn order_by(mut self, fields: &[&str]) -> Result<Self> {
        self.ensure_pending()?;
        if self.order_by.is_some() {
            return Err(UsageError::DuplicateModifier { clause: "ORDER BY" }.into());
        }
        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            resolved.push(self.resolve_modifier(field)?);
        }
        self.order_by = Some(resolved);
        Ok(self)
    }

    /// Compiles the SELECT statement and its bind parameters without
    /// executing anything.
    #[must_use]
    pub fn build_query(&self) -> (String, Vec<Value>) {
        let schema = M::schema();
        let table = schema.table();

        let mut params = Vec::new();
        let mut joins = Vec::new();
        let where_body = render(&self.filters, &mut params, &mut joins);
        for hop in &self.modifier_joins {
            if !joins.contains(hop) {
                joins.push(hop.clone());
            }
        }

        let projection = schema
            .select_columns()
            .iter()
            .map(|c| format!("{table}.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT DISTINCT {projection} FROM {table}");
        for hop in &joins {
            sql.push_str(&format!(
                " JOIN {} ON {}.{} = {}.{}",
                hop.table, hop.prev_table, hop.prev_column, hop.table, hop.column
            ));
        }
        if !where_body.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_body);
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group_by.join(", "));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by.join(", "));
        }
        (sql, params)
    }

    /// Runs the compiled SELECT. A set executes at most once.
    ///
    /// # Errors
    ///
    /// [`UsageError::AlreadyExecuted`] on a second call, plus storage
    /// errors.
    pub fn execute(&mut self, conn: &mut dyn Connection) -> Result<()> {
        self.ensure_pending()?;
        let (sql, params) = self.build_query();
        debug!(
            target: "ferrite::queryset",
            model = M::schema().model(),
            %sql,
            params = params.len(),
            "execute"
        );
        let result = conn.execute(&sql, &params).map_err(OrmError::from)?;
        self.cursor = Some(result.into_rows());
        self.executed = true;
        Ok(())
    }

    fn execute_if_pending(&mut self, conn: &mut dyn Connection) -> Result<()> {
        if self.executed {
            return Ok(());
        }
        self.execute(conn)
    }

    /// Pulls the next instance off the cursor, caching it under its
    /// primary key.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotYetExecuted`] before [`QuerySet::execute`], plus
    /// storage errors from the cursor.
    pub fn try_next(&mut self) -> Result<Option<Instance<M>>> {
        if !self.executed {
            return Err(UsageError::NotYetExecuted.into());
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next() {
            Some(Ok(row)) => {
                let instance = Instance::<M>::from_row(&row);
                let index = self.cache.len();
                // rows without a primary key stay in arrival order but are
                // not reachable by key
                if let Some(pk) = instance.pk() {
                    self.by_pk.insert(pk, index);
                }
                self.cache.push(instance.clone());
                Ok(Some(instance))
            }
            Some(Err(err)) => Err(err.into()),
            None => {
                self.cursor = None;
                Ok(None)
            }
        }
    }

    fn drain(&mut self) -> Result<()> {
        while self.try_next()?.is_some() {}
        Ok(())
    }

    /// Executes if needed, drains the cursor, and returns the number of
    /// matching rows.
    ///
    /// # Errors
    ///
    /// Storage errors from execution or the cursor.
    pub fn count(&mut self, conn: &mut dyn Connection) -> Result<usize> {
        self.execute_if_pending(conn)?;
        self.drain()?;
        Ok(self.cache.len())
    }

    /// The cached instance with the given primary key. Only rows already
    /// pulled off the cursor are visible.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotYetExecuted`] before execution,
    /// [`OrmError::KeyNotFound`] for an absent key.
    pub fn cached(&self, pk: i64) -> Result<&Instance<M>> {
        if !self.executed {
            return Err(UsageError::NotYetExecuted.into());
        }
        self.by_pk
            .get(&pk)
            .map(|&index| &self.cache[index])
            .ok_or(OrmError::KeyNotFound(pk))
    }

    /// Executes if needed and returns the first matching instance.
    ///
    /// # Errors
    ///
    /// Storage errors from execution or the cursor.
    pub fn first(&mut self, conn: &mut dyn Connection) -> Result<Option<Instance<M>>> {
        self.execute_if_pending(conn)?;
        if let Some(first) = self.cache.first() {
            return Ok(Some(first.clone()));
        }
        self.try_next()
    }

    /// Executes and expects at most one matching row.
    ///
    /// # Errors
    ///
    /// [`OrmError::MultipleResults`] when a second row matches, plus
    /// storage errors.
    pub fn get(mut self, conn: &mut dyn Connection) -> Result<Option<Instance<M>>> {
        self.execute_if_pending(conn)?;
        let first = self.try_next()?;
        if first.is_some() && self.try_next()?.is_some() {
            return Err(OrmError::MultipleResults);
        }
        Ok(first)
    }

    /// Executes if needed, drains the cursor, and returns every matching
    /// instance in arrival order.
    ///
    /// # Errors
    ///
    /// Storage errors from execution or the cursor.
    pub fn to_vec(mut self, conn: &mut dyn Connection) -> Result<Vec<Instance<M>>> {
        self.execute_if_pending(conn)?;
        self.drain()?;
        Ok(self.cache)
    }
}

/// Streaming iteration over an executed set. Yields a single
/// [`UsageError::NotYetExecuted`] and then fuses if the set was never
/// executed.
impl<M: Model> Iterator for QuerySet<M> {
    type Item = Result<Instance<M>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        match self.try_next() {
            Ok(Some(instance)) => Some(Ok(instance)),
            Ok(None) => None,
            Err(err) => {
                self.poisoned = true;
                Some(Err(err))
            }
        }
    }
}
