//! # ferrite-core
//!
//! The storage boundary shared by every ferrite crate.
//!
//! This crate defines:
//! - [`Value`]: a dynamically-typed SQL scalar used for parameter binding
//!   and result fetching
//! - [`Row`] and [`ColumnInfo`]: query results with shared column metadata
//! - [`Connection`]: the contract a storage backend must fulfil: execute a
//!   parameterized statement and hand back affected rows, the last generated
//!   key, and a forward-only row cursor
//! - [`StorageError`]: errors raised by the storage collaborator
//! - [`testing::ScriptedConnection`]: an in-memory connection double that
//!   records statements and replays canned results
//!
//! The model is deliberately synchronous: one logical process owns one
//! connection with at most one statement in flight. Issuing a new statement
//! implicitly invalidates the previous cursor.

mod connection;
mod error;
mod row;
pub mod testing;
mod value;

pub use connection::{Connection, ExecResult, Rows};
pub use error::StorageError;
pub use row::{ColumnInfo, Row};
pub use value::{ToValue, Value};
