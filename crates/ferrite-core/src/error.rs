//! Errors raised by the storage collaborator.

use thiserror::Error;

/// An error from the storage backend.
///
/// These are propagated unchanged through the ORM; the core never retries
/// or swallows them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The statement could not be prepared.
    #[error("malformed statement: {0}")]
    Malformed(String),

    /// The number of bound parameters does not match the statement.
    #[error("parameter count mismatch: statement expects {expected}, got {got}")]
    ParamCount {
        /// Placeholders in the statement.
        expected: usize,
        /// Values supplied by the caller.
        got: usize,
    },

    /// A database constraint rejected the statement.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other connection-level failure.
    #[error("connection error: {0}")]
    Connection(String),
}
