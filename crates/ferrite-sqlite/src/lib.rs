//! SQLite storage backend.
//!
//! [`SqliteConnection`] wraps a [`rusqlite::Connection`] behind the
//! [`Connection`] contract. Result rows are buffered eagerly: SQLite
//! cursors borrow their statement, and the contract hands the cursor out
//! past the statement's lifetime.

use std::path::Path;
use std::sync::Arc;

use ferrite_core::{ColumnInfo, Connection, ExecResult, Row, StorageError, Value};
use rusqlite::types::ValueRef;

/// A synchronous SQLite connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens a database file, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] when the file cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] on failure.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Runs a batch of semicolon-separated statements without parameters.
    /// Intended for schema setup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] when the batch fails to parse
    /// or execute.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), StorageError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| StorageError::Malformed(e.to_string()))
    }
}

fn bind_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        Value::Int(n) => rusqlite::types::Value::Integer(*n),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
    }
}

fn read_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn map_step_error(err: &rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(failure, message) = err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return StorageError::Constraint(
                message.clone().unwrap_or_else(|| failure.to_string()),
            );
        }
    }
    StorageError::Connection(err.to_string())
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult, StorageError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StorageError::Malformed(e.to_string()))?;

        let expected = stmt.parameter_count();
        if expected != params.len() {
            return Err(StorageError::ParamCount {
                expected,
                got: params.len(),
            });
        }
        for (index, param) in params.iter().enumerate() {
            stmt.raw_bind_parameter(index + 1, bind_value(param))
                .map_err(|e| StorageError::Malformed(e.to_string()))?;
        }

        if stmt.column_count() == 0 {
            // last_insert_rowid is connection-wide state; only a change
            // across this statement means this statement inserted
            let rowid_before = self.conn.last_insert_rowid();
            let affected = stmt.raw_execute().map_err(|e| map_step_error(&e))?;
            drop(stmt);
            let rowid_after = self.conn.last_insert_rowid();
            return Ok(ExecResult::of_count(
                affected as u64,
                (rowid_after != rowid_before).then_some(rowid_after),
            ));
        }

        let columns = Arc::new(ColumnInfo::new(
            stmt.column_names().iter().map(|c| String::from(*c)).collect(),
        ));
        let mut buffered = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(|e| map_step_error(&e))? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value = row
                    .get_ref(index)
                    .map_err(|e| StorageError::Connection(e.to_string()))?;
                values.push(read_value(value));
            }
            buffered.push(Row::with_columns(Arc::clone(&columns), values));
        }
        Ok(ExecResult::of_rows(buffered))
    }
}
