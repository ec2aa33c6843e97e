//! Query compilation: lookup expressions and the filter tree.
//!
//! A QuerySet accumulates [`FilterNode`]s built from parsed [`Lookup`]s;
//! rendering walks the tree once, collecting bind parameters in encounter
//! order and join hops deduplicated in first-use order.

pub mod filter;
pub mod lookup;

pub use filter::{Combinator, FilterNode, Predicate};
pub use lookup::{JoinHop, Lookup, Operator};
