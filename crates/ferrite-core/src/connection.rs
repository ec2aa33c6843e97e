//! The connection contract.

use crate::error::StorageError;
use crate::row::Row;
use crate::value::Value;

/// A forward-only cursor over result rows.
///
/// Backends may stream or buffer internally; consumers must treat the
/// cursor as single-pass either way.
pub type Rows = Box<dyn Iterator<Item = Result<Row, StorageError>>>;

/// The handle returned by [`Connection::execute`].
///
/// Exposes the affected-row count, the last generated primary key (for
/// inserts), and the row cursor for statements that produce rows.
pub struct ExecResult {
    affected_rows: u64,
    last_insert_id: Option<i64>,
    rows: Rows,
}

impl ExecResult {
    /// Creates a result handle.
    #[must_use]
    pub fn new(affected_rows: u64, last_insert_id: Option<i64>, rows: Rows) -> Self {
        Self {
            affected_rows,
            last_insert_id,
            rows,
        }
    }

    /// Creates a result for a statement that produced no rows.
    #[must_use]
    pub fn of_count(affected_rows: u64, last_insert_id: Option<i64>) -> Self {
        Self::new(affected_rows, last_insert_id, Box::new(std::iter::empty()))
    }

    /// Creates a result for a statement that produced rows.
    #[must_use]
    pub fn of_rows(rows: Vec<Row>) -> Self {
        Self::new(0, None, Box::new(rows.into_iter().map(Ok)))
    }

    /// Returns the number of rows the statement changed.
    #[must_use]
    pub const fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Returns the last generated primary key, if the backend reported one.
    #[must_use]
    pub const fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// Consumes the handle and returns the row cursor.
    #[must_use]
    pub fn into_rows(self) -> Rows {
        self.rows
    }
}

impl std::fmt::Debug for ExecResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecResult")
            .field("affected_rows", &self.affected_rows)
            .field("last_insert_id", &self.last_insert_id)
            .finish_non_exhaustive()
    }
}

/// A synchronous storage connection.
///
/// Parameter binding is strictly positional with `?` placeholders; count
/// and order must match the supplied values exactly. At most one statement
/// is in flight per connection; executing a new statement invalidates any
/// cursor from the previous one.
pub trait Connection {
    /// Executes a parameterized statement.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult, StorageError>;
}
