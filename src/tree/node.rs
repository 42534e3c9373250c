//! Arena node types
//!
//! Tree nodes live in a dense per-tree arena and refer to each other by
//! index. A node's `parent` is `None` exactly when it is the root of its
//! arena; children are stored as an ordered index sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::params::FunctionSymbol;

/// Index of a node within its owning tree's arena.
///
/// Ids are only meaningful for the arena that issued them; they are
/// invalidated by substitution (the arena is compacted afterwards).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// A leaf payload: a named variable or a numeric constant drawn at
/// construction time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Terminal {
    /// Variable name from the terminal alphabet
    Variable(String),
    /// Random constant, rendered through `Display`
    Constant(f64),
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Constant(value) => write!(f, "{value}"),
        }
    }
}

/// The payload of a node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Internal node carrying a function symbol; always has exactly
    /// `arity` children
    Function(FunctionSymbol),
    /// Leaf node; never has children
    Terminal(Terminal),
}

impl NodeKind {
    /// Check if this is a terminal payload
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Check if this is a function payload
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }
}

/// One arena slot: payload plus structural links
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node payload
    pub(crate) kind: NodeKind,
    /// Parent index; `None` for the root
    pub(crate) parent: Option<NodeId>,
    /// Ordered child indices; empty for terminals, `arity`-long for
    /// functions
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn terminal(terminal: Terminal) -> Self {
        Self {
            kind: NodeKind::Terminal(terminal),
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn function(symbol: FunctionSymbol, children: Vec<NodeId>) -> Self {
        Self {
            kind: NodeKind::Function(symbol),
            parent: None,
            children,
        }
    }

    /// The node payload
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The parent id, `None` for a root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The ordered child ids
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is the root of its arena
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
