//! Error types for the ORM.
//!
//! Two families, so callers can pattern-match on intent:
//!
//! - [`UsageError`]: caller programming errors (schema declaration,
//!   lookup expressions, modifiers, access before execution). These are
//!   expected to be eliminated during development.
//! - [`OrmError`]: everything surfaced at runtime: validation failures,
//!   relationship type mismatches, result-shape errors, storage errors.
//!   Wraps `UsageError` and `StorageError` transparently.

use ferrite_core::StorageError;
use thiserror::Error;

/// A caller programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// A model schema declares no primary key.
    #[error("model {model} declares no primary key")]
    NoPrimaryKey {
        /// Model name.
        model: String,
    },

    /// A model schema declares more than one primary key.
    #[error("model {model} declares a second primary key on field {field}")]
    MultiplePrimaryKeys {
        /// Model name.
        model: String,
        /// The offending field.
        field: String,
    },

    /// The same property was registered twice on one schema.
    #[error("model {model} registers field {field} more than once")]
    DuplicateField {
        /// Model name.
        model: String,
        /// The offending field.
        field: String,
    },

    /// An unknown property name on read or write.
    #[error("model {model} has no field {field}")]
    FieldNotFound {
        /// Model name.
        model: String,
        /// The requested field.
        field: String,
    },

    /// A lookup expression traverses a segment that is neither a field nor
    /// a relationship on the current model.
    #[error("{segment} in lookup {path} is not a valid field or relationship")]
    InvalidLookup {
        /// The full lookup expression.
        path: String,
        /// The segment that failed to resolve.
        segment: String,
    },

    /// `group_by` or `order_by` was specified twice on one QuerySet.
    #[error("modifier {clause} may only be specified once per query")]
    DuplicateModifier {
        /// The clause kind, e.g. `ORDER BY`.
        clause: &'static str,
    },

    /// Indexed access into a QuerySet cache before execution.
    #[error("the query has not been executed yet")]
    NotYetExecuted,

    /// Filters or modifiers were mutated after execution.
    #[error("the query has already been executed")]
    AlreadyExecuted,
}

/// An ORM operation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrmError {
    /// A caller programming error.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A value was rejected by field validation.
    #[error("invalid value for field {field} of {model}")]
    InvalidField {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
    },

    /// A relationship was assigned an instance of the wrong model.
    #[error("expected an instance of {expected}, got {got}")]
    TypeMismatch {
        /// The declared target model.
        expected: String,
        /// What the caller supplied.
        got: String,
    },

    /// A foreign key assigned by integer did not resolve to a target row.
    #[error("primary key {pk} does not resolve to a {model} row")]
    UnresolvedForeignKey {
        /// The target model.
        model: String,
        /// The unresolvable key.
        pk: i64,
    },

    /// `get` matched more than one row.
    #[error("multiple rows returned when exactly one was expected")]
    MultipleResults,

    /// Indexed access into an executed QuerySet cache with an absent key.
    #[error("no cached instance with primary key {0}")]
    KeyNotFound(i64),

    /// An error from the storage collaborator, propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
