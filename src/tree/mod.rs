//! Expression-tree representation
//!
//! This module provides the tree data structure, its node arena, and the
//! growth parameters used to build random trees.

pub mod expr;
pub mod node;
pub mod params;

pub mod prelude {
    pub use super::expr::{ExpressionTree, Subtree};
    pub use super::node::{Node, NodeId, NodeKind, Terminal};
    pub use super::params::{FunctionSymbol, TreeInitParameters};
}
