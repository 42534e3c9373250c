//! Expression trees
//!
//! This module provides the candidate-program representation: a tree of
//! function and terminal nodes stored in a dense index arena, together with
//! random growth, structural queries, and subtree substitution.

use std::fmt;
use std::sync::Arc;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tree::node::{Node, NodeId, NodeKind, Terminal};
use crate::tree::params::{FunctionSymbol, TreeInitParameters};

/// Render the prefix-call expression rooted at `id`.
fn render(nodes: &[Node], id: NodeId) -> String {
    let node = &nodes[id.0];
    match &node.kind {
        NodeKind::Terminal(t) => t.to_string(),
        NodeKind::Function(f) => {
            let args: Vec<String> = node
                .children
                .iter()
                .map(|&child| render(nodes, child))
                .collect();
            format!("{}({})", f.name, args.join(","))
        }
    }
}

/// Height of the subtree rooted at `id`: 0 for a leaf, otherwise one more
/// than the tallest child.
fn subtree_height(nodes: &[Node], id: NodeId) -> usize {
    let children = &nodes[id.0].children;
    if children.is_empty() {
        0
    } else {
        children
            .iter()
            .map(|&child| subtree_height(nodes, child))
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// A detached subtree: a self-contained mini-arena whose root sits at
/// index 0.
///
/// Subtrees are the unit of structural exchange between trees: cloned out
/// of one tree and spliced into another (crossover), or grown fresh and
/// spliced in place of an existing node (mutation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subtree {
    nodes: Vec<Node>,
}

impl Subtree {
    /// Build a single-leaf subtree
    pub fn terminal(terminal: Terminal) -> Self {
        Self {
            nodes: vec![Node::terminal(terminal)],
        }
    }

    /// Build a function subtree from child subtrees.
    ///
    /// Fails fast with [`TreeError::InvalidArity`] when the number of
    /// children differs from the symbol's arity.
    pub fn function(symbol: FunctionSymbol, children: Vec<Subtree>) -> Result<Self, TreeError> {
        if children.len() != symbol.arity {
            return Err(TreeError::InvalidArity {
                name: symbol.name,
                expected: symbol.arity,
                actual: children.len(),
            });
        }

        let mut nodes = vec![Node::function(symbol, Vec::new())];
        let mut child_roots = Vec::with_capacity(children.len());
        for child in children {
            let offset = nodes.len();
            child_roots.push(NodeId(offset));
            for node in child.nodes {
                nodes.push(Node {
                    kind: node.kind,
                    parent: Some(node.parent.map_or(NodeId(0), |p| NodeId(p.0 + offset))),
                    children: node
                        .children
                        .iter()
                        .map(|c| NodeId(c.0 + offset))
                        .collect(),
                });
            }
        }
        nodes[0].children = child_roots;
        Ok(Self { nodes })
    }

    /// Grow a random subtree of at most `target_height`.
    ///
    /// With `p_full == 1.0` this is the "full" method (every leaf at
    /// exactly `target_height`); smaller values let each child slot
    /// collapse to a leaf instead, which is the "grow" method. A target
    /// height of 0 always yields a single terminal.
    pub fn grow<R: Rng>(
        params: &TreeInitParameters,
        target_height: usize,
        p_full: f64,
        rng: &mut R,
    ) -> Self {
        let mut nodes = Vec::new();
        grow_node(&mut nodes, None, params, target_height, p_full, rng);
        Self { nodes }
    }

    /// Number of nodes in this subtree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the subtree is a single leaf
    pub fn is_leaf(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Height of this subtree
    pub fn height(&self) -> usize {
        subtree_height(&self.nodes, NodeId(0))
    }

    /// Whether the subtree has no nodes; never true for constructed
    /// values, present for API completeness
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Prefix-call rendering of this subtree
    pub fn expression(&self) -> String {
        render(&self.nodes, NodeId(0))
    }
}

/// Recursive growth helper. Appends the grown node (and its descendants)
/// to `nodes` in preorder and returns its id.
fn grow_node<R: Rng>(
    nodes: &mut Vec<Node>,
    parent: Option<NodeId>,
    params: &TreeInitParameters,
    target_height: usize,
    p_full: f64,
    rng: &mut R,
) -> NodeId {
    if target_height == 0 {
        let terminal = if rng.gen::<f64>() < params.p_rand() {
            Terminal::Constant(params.random_constant(rng))
        } else {
            Terminal::Variable(params.random_terminal(rng).to_string())
        };
        let id = NodeId(nodes.len());
        let mut node = Node::terminal(terminal);
        node.parent = parent;
        nodes.push(node);
        id
    } else {
        let symbol = params.random_function(rng).clone();
        let arity = symbol.arity;
        let id = NodeId(nodes.len());
        let mut node = Node::function(symbol, Vec::new());
        node.parent = parent;
        nodes.push(node);

        let mut children = Vec::with_capacity(arity);
        for _ in 0..arity {
            let child_height = if rng.gen::<f64>() < p_full {
                target_height - 1
            } else {
                0
            };
            children.push(grow_node(nodes, Some(id), params, child_height, p_full, rng));
        }
        nodes[id.0].children = children;
        id
    }
}

/// One candidate program: an arena of nodes with a single root, a hard
/// height ceiling, a cached fitness, and a reference to the growth
/// parameters it was built from.
///
/// Cloning a tree deep-copies the whole arena; clones never alias.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpressionTree {
    nodes: Vec<Node>,
    root: NodeId,
    max_height: usize,
    fitness: Option<f64>,
    params: Arc<TreeInitParameters>,
}

impl ExpressionTree {
    /// Grow a fresh random tree.
    ///
    /// `target_height` is clamped to `max_height` before growth, so the
    /// result never exceeds the ceiling for any `p_full` in `[0, 1]`.
    pub fn random<R: Rng>(
        params: Arc<TreeInitParameters>,
        max_height: usize,
        target_height: usize,
        p_full: f64,
        rng: &mut R,
    ) -> Self {
        let target = target_height.min(max_height);
        let subtree = Subtree::grow(&params, target, p_full, rng);
        Self {
            nodes: subtree.nodes,
            root: NodeId(0),
            max_height,
            fitness: None,
            params,
        }
    }

    /// Wrap an explicitly built subtree as a whole tree
    pub fn from_subtree(
        params: Arc<TreeInitParameters>,
        max_height: usize,
        subtree: Subtree,
    ) -> Self {
        Self {
            nodes: subtree.nodes,
            root: NodeId(0),
            max_height,
            fitness: None,
            params,
        }
    }

    /// The root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The height ceiling this tree must never exceed
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// The shared growth parameters
    pub fn params(&self) -> &Arc<TreeInitParameters> {
        &self.params
    }

    /// Cached fitness, `None` until evaluated
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Store an evaluated fitness
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Drop the cached fitness (after a structural change)
    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    /// Height of the whole tree (0 for a single leaf)
    pub fn height(&self) -> usize {
        subtree_height(&self.nodes, self.root)
    }

    /// Height of the subtree rooted at `id`
    pub fn node_height(&self, id: NodeId) -> usize {
        subtree_height(&self.nodes, id)
    }

    /// Depth of `id`: parent hops to the root (the root has depth 0)
    pub fn node_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            current = parent;
            depth += 1;
        }
        depth
    }

    /// Preorder traversal of all node ids, root first
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Push children reversed so the leftmost is visited first
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Pick a node uniformly at random over the whole tree
    pub fn random_node<R: Rng>(&self, rng: &mut R) -> NodeId {
        let order = self.preorder();
        *order
            .choose(rng)
            .unwrap_or_else(|| unreachable!("a tree always has at least its root"))
    }

    /// Pick a node uniformly at random among those whose depth and height
    /// both fall within the given bounds.
    ///
    /// Fails with [`TreeError::EmptySelection`] when no node qualifies;
    /// the failure is logged with the bound values and node counts.
    pub fn random_node_bounded<R: Rng>(
        &self,
        max_depth: usize,
        max_height: usize,
        rng: &mut R,
    ) -> Result<NodeId, TreeError> {
        let order = self.preorder();
        let depths = self.depth_table(&order);
        let heights = self.height_table(&order);

        let valid: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|id| depths[id.0] <= max_depth && heights[id.0] <= max_height)
            .collect();

        match valid.choose(rng) {
            Some(&id) => Ok(id),
            None => {
                warn!(
                    "empty node selection: depth <= {max_depth}, height <= {max_height}, \
                     {valid} of {total} nodes eligible",
                    valid = valid.len(),
                    total = order.len(),
                );
                Err(TreeError::EmptySelection {
                    max_depth,
                    max_height,
                    total: order.len(),
                    valid: valid.len(),
                })
            }
        }
    }

    /// Depths for every node, indexed by arena slot. `order` must be a
    /// preorder traversal so parents are seen before children.
    fn depth_table(&self, order: &[NodeId]) -> Vec<usize> {
        let mut depths = vec![0usize; self.nodes.len()];
        for &id in order {
            if let Some(parent) = self.nodes[id.0].parent {
                depths[id.0] = depths[parent.0] + 1;
            }
        }
        depths
    }

    /// Subtree heights for every node, indexed by arena slot. Processes
    /// the preorder reversed so children are seen before parents.
    fn height_table(&self, order: &[NodeId]) -> Vec<usize> {
        let mut heights = vec![0usize; self.nodes.len()];
        for &id in order.iter().rev() {
            let children = &self.nodes[id.0].children;
            if !children.is_empty() {
                heights[id.0] = children.iter().map(|c| heights[c.0]).max().unwrap_or(0) + 1;
            }
        }
        heights
    }

    /// Copy the subtree rooted at `id` out into a detached arena
    pub fn clone_subtree(&self, id: NodeId) -> Subtree {
        let mut nodes = Vec::new();
        self.copy_into(id, None, &mut nodes);
        Subtree { nodes }
    }

    fn copy_into(&self, id: NodeId, parent: Option<NodeId>, out: &mut Vec<Node>) -> NodeId {
        let new_id = NodeId(out.len());
        out.push(Node {
            kind: self.nodes[id.0].kind.clone(),
            parent,
            children: Vec::new(),
        });
        let children: Vec<NodeId> = self.nodes[id.0]
            .children
            .clone()
            .into_iter()
            .map(|child| self.copy_into(child, Some(new_id), out))
            .collect();
        out[new_id.0].children = children;
        new_id
    }

    /// Replace the node `old` (and the subtree below it) with
    /// `replacement`.
    ///
    /// When `old` is the root the replacement becomes the new root;
    /// otherwise it takes `old`'s position in its parent's child
    /// sequence. The arena is compacted afterwards, so all previously
    /// issued ids are invalidated. `old` must belong to this tree.
    pub fn substitute(&mut self, old: NodeId, replacement: Subtree) {
        let offset = self.nodes.len();
        for node in replacement.nodes {
            self.nodes.push(Node {
                kind: node.kind,
                parent: node.parent.map(|p| NodeId(p.0 + offset)),
                children: node
                    .children
                    .iter()
                    .map(|c| NodeId(c.0 + offset))
                    .collect(),
            });
        }
        let new_root = NodeId(offset);

        match self.nodes[old.0].parent {
            None => {
                self.root = new_root;
                self.nodes[new_root.0].parent = None;
            }
            Some(parent) => {
                let slot = self.nodes[parent.0]
                    .children
                    .iter()
                    .position(|&c| c == old)
                    .expect("old node is linked from its parent");
                self.nodes[parent.0].children[slot] = new_root;
                self.nodes[new_root.0].parent = Some(parent);
            }
        }

        self.compact();
    }

    /// Rebuild the arena to exactly the nodes reachable from the root,
    /// in preorder.
    fn compact(&mut self) {
        let order = self.preorder();
        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_index, id) in order.iter().enumerate() {
            remap[id.0] = new_index;
        }

        let mut nodes = Vec::with_capacity(order.len());
        for &id in &order {
            let node = &self.nodes[id.0];
            nodes.push(Node {
                kind: node.kind.clone(),
                parent: node.parent.map(|p| NodeId(remap[p.0])),
                children: node.children.iter().map(|c| NodeId(remap[c.0])).collect(),
            });
        }
        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// The fully parenthesized prefix-call expression for this tree,
    /// e.g. `add(x,mul(y,2))`
    pub fn expression(&self) -> String {
        render(&self.nodes, self.root)
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression())
    }
}
