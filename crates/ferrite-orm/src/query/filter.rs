//! The recursive filter tree and its WHERE-clause rendering.

use ferrite_core::Value;

use super::lookup::{JoinHop, Lookup};

/// How a filter node combines with what precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Conjunction.
    And,
    /// Negated conjunction. As the first node it renders a leading `NOT`.
    AndNot,
    /// Disjunction.
    Or,
    /// Exclusive disjunction.
    Xor,
}

impl Combinator {
    /// The SQL token emitted between this node and the previous one.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::AndNot => "AND NOT",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }
}

/// One comparison: a resolved lookup and its bind value, already
/// operator-transformed.
#[derive(Debug, Clone)]
pub struct Predicate {
    /// The resolved lookup.
    pub lookup: Lookup,
    /// The bind value.
    pub value: Value,
}

/// A node of the filter tree.
///
/// One filter call produces one `Atomic` node whose predicates are ANDed
/// together. Attaching a whole QuerySet produces a `Group` wrapping that
/// set's nodes, preserving its internal structure under one pair of
/// parentheses.
#[derive(Debug, Clone)]
pub enum FilterNode {
    /// A conjunction of predicates from a single filter call.
    Atomic {
        /// How this node combines with the preceding node.
        combinator: Combinator,
        /// The predicates, ANDed.
        predicates: Vec<Predicate>,
    },
    /// A nested subtree from an attached QuerySet.
    Group {
        /// How this node combines with the preceding node.
        combinator: Combinator,
        /// The subtree's own nodes, rendered inside one parenthesis pair.
        nodes: Vec<FilterNode>,
    },
}

impl FilterNode {
    const fn combinator(&self) -> Combinator {
        match self {
            Self::Atomic { combinator, .. } | Self::Group { combinator, .. } => *combinator,
        }
    }
}

/// Renders a node list as a WHERE-clause body.
///
/// Every node is parenthesized. Bind values are appended to `params` in
/// encounter order; join hops are appended to `joins` in first-use order,
/// skipping hops already present.
pub fn render(nodes: &[FilterNode], params: &mut Vec<Value>, joins: &mut Vec<JoinHop>) -> String {
    let mut out = String::new();
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            out.push(' ');
            out.push_str(node.combinator().token());
            out.push(' ');
        } else if node.combinator() == Combinator::AndNot {
            out.push_str("NOT ");
        }
        match node {
            FilterNode::Atomic { predicates, .. } => {
                out.push('(');
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" AND ");
                    }
                    let lookup = &predicate.lookup;
                    out.push_str(&format!(
                        "{}.{} {} ?",
                        lookup.table,
                        lookup.column,
                        lookup.op.token()
                    ));
                    params.push(predicate.value.clone());
                    for hop in &lookup.joins {
                        if !joins.contains(hop) {
                            joins.push(hop.clone());
                        }
                    }
                }
                out.push(')');
            }
            FilterNode::Group { nodes, .. } => {
                out.push('(');
                out.push_str(&render(nodes, params, joins));
                out.push(')');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::lookup::Operator;

    fn lookup(table: &str, column: &str, op: Operator) -> Lookup {
        Lookup {
            table: table.into(),
            column: column.into(),
            op,
            joins: Vec::new(),
        }
    }

    fn atomic(combinator: Combinator, predicates: Vec<Predicate>) -> FilterNode {
        FilterNode::Atomic {
            combinator,
            predicates,
        }
    }

    #[test]
    fn test_single_node() {
        let nodes = vec![atomic(
            Combinator::And,
            vec![Predicate {
                lookup: lookup("book", "title", Operator::Equals),
                value: Value::Text("Dune".into()),
            }],
        )];
        let mut params = Vec::new();
        let mut joins = Vec::new();
        let sql = render(&nodes, &mut params, &mut joins);
        assert_eq!(sql, "(book.title = ?)");
        assert_eq!(params, vec![Value::Text("Dune".into())]);
        assert!(joins.is_empty());
    }

    #[test]
    fn test_combinator_tokens_between_nodes() {
        let nodes = vec![
            atomic(
                Combinator::And,
                vec![Predicate {
                    lookup: lookup("book", "title", Operator::Equals),
                    value: Value::Text("Dune".into()),
                }],
            ),
            atomic(
                Combinator::Or,
                vec![Predicate {
                    lookup: lookup("book", "year", Operator::Gte),
                    value: Value::Int(1990),
                }],
            ),
            atomic(
                Combinator::AndNot,
                vec![Predicate {
                    lookup: lookup("book", "title", Operator::Contains),
                    value: Value::Text("%draft%".into()),
                }],
            ),
        ];
        let mut params = Vec::new();
        let mut joins = Vec::new();
        let sql = render(&nodes, &mut params, &mut joins);
        assert_eq!(
            sql,
            "(book.title = ?) OR (book.year >= ?) AND NOT (book.title LIKE ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("Dune".into()),
                Value::Int(1990),
                Value::Text("%draft%".into()),
            ]
        );
    }

    #[test]
    fn test_leading_exclusion() {
        let nodes = vec![atomic(
            Combinator::AndNot,
            vec![Predicate {
                lookup: lookup("book", "title", Operator::Equals),
                value: Value::Text("Dune".into()),
            }],
        )];
        let mut params = Vec::new();
        let mut joins = Vec::new();
        let sql = render(&nodes, &mut params, &mut joins);
        assert_eq!(sql, "NOT (book.title = ?)");
    }

    #[test]
    fn test_group_nesting_and_param_order() {
        let inner = vec![
            atomic(
                Combinator::And,
                vec![Predicate {
                    lookup: lookup("book", "year", Operator::Lt),
                    value: Value::Int(1960),
                }],
            ),
            atomic(
                Combinator::Or,
                vec![Predicate {
                    lookup: lookup("book", "year", Operator::Gt),
                    value: Value::Int(2000),
                }],
            ),
        ];
        let nodes = vec![
            atomic(
                Combinator::And,
                vec![Predicate {
                    lookup: lookup("book", "title", Operator::StartsWith),
                    value: Value::Text("D%".into()),
                }],
            ),
            FilterNode::Group {
                combinator: Combinator::And,
                nodes: inner,
            },
        ];
        let mut params = Vec::new();
        let mut joins = Vec::new();
        let sql = render(&nodes, &mut params, &mut joins);
        assert_eq!(
            sql,
            "(book.title LIKE ?) AND ((book.year < ?) OR (book.year > ?))"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("D%".into()),
                Value::Int(1960),
                Value::Int(2000),
            ]
        );
    }

    #[test]
    fn test_join_dedup_preserves_order() {
        let hop = JoinHop {
            table: "author".into(),
            prev_table: "book".into(),
            prev_column: "author_id".into(),
            column: "id".into(),
        };
        let mut with_join = lookup("author", "name", Operator::Equals);
        with_join.joins.push(hop.clone());
        let nodes = vec![atomic(
            Combinator::And,
            vec![
                Predicate {
                    lookup: with_join.clone(),
                    value: Value::Text("Herbert".into()),
                },
                Predicate {
                    lookup: with_join,
                    value: Value::Text("Asimov".into()),
                },
            ],
        )];
        let mut params = Vec::new();
        let mut joins = Vec::new();
        render(&nodes, &mut params, &mut joins);
        assert_eq!(joins, vec![hop]);
    }
}
