//! An in-memory connection double for tests.
//!
//! [`ScriptedConnection`] records every statement it receives and replays
//! canned results in order, so the ORM can be exercised without a database.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::connection::{Connection, ExecResult};
use crate::error::StorageError;
use crate::row::{ColumnInfo, Row};
use crate::value::Value;

/// One canned reply for a [`ScriptedConnection`].
#[derive(Debug, Clone, Default)]
pub struct CannedResult {
    affected_rows: u64,
    last_insert_id: Option<i64>,
    rows: Vec<Row>,
}

impl CannedResult {
    /// An empty result: no rows, nothing affected.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reply to an INSERT: one row affected, the given generated key.
    #[must_use]
    pub fn insert(last_insert_id: i64) -> Self {
        Self {
            affected_rows: 1,
            last_insert_id: Some(last_insert_id),
            rows: Vec::new(),
        }
    }

    /// A reply with only an affected-row count.
    #[must_use]
    pub fn affected(count: u64) -> Self {
        Self {
            affected_rows: count,
            ..Self::default()
        }
    }

    /// A reply carrying result rows.
    #[must_use]
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let info = Arc::new(ColumnInfo::new(
            columns.iter().map(|c| String::from(*c)).collect(),
        ));
        Self {
            affected_rows: 0,
            last_insert_id: None,
            rows: rows
                .into_iter()
                .map(|values| Row::with_columns(Arc::clone(&info), values))
                .collect(),
        }
    }
}

/// A connection double that replays scripted results.
///
/// Replies are consumed front to back; when the script runs dry the
/// connection answers with empty results. Every executed statement is
/// appended to [`ScriptedConnection::log`] together with its parameters.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    script: VecDeque<CannedResult>,
    /// Every `(sql, params)` pair seen, in execution order.
    pub log: Vec<(String, Vec<Value>)>,
}

impl ScriptedConnection {
    /// Creates a connection with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a canned reply to the script.
    pub fn enqueue(&mut self, result: CannedResult) -> &mut Self {
        self.script.push_back(result);
        self
    }

    /// Returns the number of statements executed so far.
    #[must_use]
    pub fn statements(&self) -> usize {
        self.log.len()
    }

    /// Returns the last executed statement, if any.
    #[must_use]
    pub fn last_statement(&self) -> Option<&(String, Vec<Value>)> {
        self.log.last()
    }
}

impl Connection for ScriptedConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult, StorageError> {
        self.log.push((String::from(sql), params.to_vec()));
        let canned = self.script.pop_front().unwrap_or_default();
        Ok(ExecResult::new(
            canned.affected_rows,
            canned.last_insert_id,
            Box::new(canned.rows.into_iter().map(Ok)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut conn = ScriptedConnection::new();
        conn.enqueue(CannedResult::insert(7))
            .enqueue(CannedResult::rows(&["id"], vec![vec![Value::Int(7)]]));

        let first = conn.execute("INSERT INTO t (a) VALUES (?)", &[Value::Int(1)]);
        assert_eq!(first.unwrap().last_insert_id(), Some(7));

        let second = conn.execute("SELECT id FROM t", &[]).unwrap();
        let rows: Vec<_> = second.into_rows().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Int(7)));

        assert_eq!(conn.statements(), 2);
        assert_eq!(conn.log[0].1, vec![Value::Int(1)]);
    }

    #[test]
    fn test_dry_script_answers_empty() {
        let mut conn = ScriptedConnection::new();
        let result = conn.execute("SELECT 1", &[]).unwrap();
        assert_eq!(result.affected_rows(), 0);
        assert!(result.into_rows().next().is_none());
    }
}
