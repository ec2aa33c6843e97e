//! Lookup expression parsing.
//!
//! A lookup is a `__`-separated path: zero or more relationship hops, a
//! terminal column field, and an optional trailing comparison operator.
//! `author__name__startswith` hops over the `author` foreign key, lands on
//! the target's `name` column, and compares with a prefix `LIKE`.
//!
//! Parsing is eager and total: every segment must resolve against the
//! schema it is reached on, so a misspelled path fails at filter time
//! instead of surfacing as a storage error later.

use ferrite_core::Value;

use crate::error::UsageError;
use crate::schema::ModelSchema;

/// A comparison operator, recognized as the final lookup segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Exact equality. The default when no operator segment is present.
    Equals,
    /// Prefix match, `LIKE value%`.
    StartsWith,
    /// Suffix match, `LIKE %value`.
    EndsWith,
    /// Substring match, `LIKE %value%`.
    Contains,
    /// Less than or equal.
    Lte,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Inequality.
    Neq,
}

impl Operator {
    /// Parses an operator keyword segment.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "equals" => Some(Self::Equals),
            "startswith" => Some(Self::StartsWith),
            "endswith" => Some(Self::EndsWith),
            "contains" => Some(Self::Contains),
            "lte" => Some(Self::Lte),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "neq" => Some(Self::Neq),
            _ => None,
        }
    }

    /// The SQL comparison token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::StartsWith | Self::EndsWith | Self::Contains => "LIKE",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Neq => "<>",
        }
    }

    /// Transforms the bind value for this operator. The `LIKE` family
    /// wraps the plain-text rendering in wildcards; everything else binds
    /// the value unchanged.
    #[must_use]
    pub fn transform(self, value: Value) -> Value {
        match self {
            Self::StartsWith => Value::Text(format!("{}%", value.to_plain_string())),
            Self::EndsWith => Value::Text(format!("%{}", value.to_plain_string())),
            Self::Contains => Value::Text(format!("%{}%", value.to_plain_string())),
            _ => value,
        }
    }
}

/// One JOIN step produced by a relationship hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinHop {
    /// The table being joined in.
    pub table: String,
    /// The table on the near side of the ON predicate.
    pub prev_table: String,
    /// Near-side column: the foreign-key column for a forward hop, the
    /// primary-key column for a reverse hop.
    pub prev_column: String,
    /// Far-side column on `table`.
    pub column: String,
}

/// A fully resolved lookup: the table and column the comparison targets,
/// the operator, and the joins needed to reach them.
#[derive(Debug, Clone)]
pub struct Lookup {
    /// Table holding the compared column.
    pub table: String,
    /// The compared storage column.
    pub column: String,
    /// Comparison operator.
    pub op: Operator,
    /// Join hops, root-outward.
    pub joins: Vec<JoinHop>,
}

/// Parses a lookup expression against the given root schema.
///
/// # Errors
///
/// Returns [`UsageError::InvalidLookup`] naming the first segment that is
/// not a field, relationship, or operator where one is required.
pub fn parse(schema: &'static ModelSchema, expr: &str) -> Result<Lookup, UsageError> {
    let invalid = |segment: &str| UsageError::InvalidLookup {
        path: expr.to_owned(),
        segment: segment.to_owned(),
    };

    let mut segments: Vec<&str> = expr.split("__").collect();

    // A trailing operator keyword is only meaningful after a field segment.
    let op = if segments.len() >= 2 {
        match segments.last().and_then(|s| Operator::parse(s)) {
            Some(op) => {
                segments.pop();
                op
            }
            None => Operator::Equals,
        }
    } else {
        Operator::Equals
    };

    let mut current = schema;
    let mut joins = Vec::new();

    let (&terminal, hops) = segments.split_last().ok_or_else(|| invalid(expr))?;

    for &segment in hops {
        let field = current.field(segment).ok_or_else(|| invalid(segment))?;
        if field.kind.is_forward() {
            // forward: prev.fk_column = target.pk_column
            let target = field
                .kind
                .target()
                .map(|t| t())
                .ok_or_else(|| invalid(segment))?;
            joins.push(JoinHop {
                table: target.table().to_owned(),
                prev_table: current.table().to_owned(),
                prev_column: field
                    .column
                    .clone()
                    .ok_or_else(|| invalid(segment))?,
                column: target.pk_column().to_owned(),
            });
            current = target;
        } else if let crate::fields::FieldKind::Reverse(rev) = &field.kind {
            // reverse: prev.pk_column = child.fk_column
            let child = (rev.child)();
            let fk_column = child
                .column_for(rev.foreign_key)
                .ok_or_else(|| invalid(segment))?;
            joins.push(JoinHop {
                table: child.table().to_owned(),
                prev_table: current.table().to_owned(),
                prev_column: current.pk_column().to_owned(),
                column: fk_column.to_owned(),
            });
            current = child;
        } else {
            return Err(invalid(segment));
        }
    }

    let field = current.field(terminal).ok_or_else(|| invalid(terminal))?;
    let column = field.column.clone().ok_or_else(|| invalid(terminal))?;

    Ok(Lookup {
        table: current.table().to_owned(),
        column,
        op,
        joins,
    })
}
