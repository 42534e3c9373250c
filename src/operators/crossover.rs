//! Subtree-exchange crossover
//!
//! Swaps a randomly chosen subtree between deep copies of two parents,
//! with an optional height-budget restriction on the second pick that
//! keeps both offspring within their height ceilings.

use log::warn;
use rand::Rng;

use crate::tree::expr::ExpressionTree;
use crate::tree::node::NodeId;

/// Subtree-exchange crossover. Arity 2.
///
/// Parents are never mutated; both offspring are deep copies with one
/// subtree swapped between them. With `allow_bloat == false` (the
/// default) the second subtree pick is bounded so that neither offspring
/// can exceed its own `max_height`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Crossover {
    allow_bloat: bool,
}

impl Crossover {
    /// Create a crossover with bloat control enabled
    pub fn new() -> Self {
        Self { allow_bloat: false }
    }

    /// Set whether offspring may outgrow their height ceiling
    pub fn with_bloat(mut self, allow: bool) -> Self {
        self.allow_bloat = allow;
        self
    }

    /// Whether bloat is allowed
    pub fn allows_bloat(&self) -> bool {
        self.allow_bloat
    }

    /// Cross two parents, producing two offspring
    pub fn apply<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        rng: &mut R,
    ) -> (ExpressionTree, ExpressionTree) {
        let mut offspring1 = parent1.clone();
        let mut offspring2 = parent2.clone();
        offspring1.clear_fitness();
        offspring2.clear_fitness();

        let subtree1 = offspring1.random_node(rng);
        let subtree2 = self.pick_second(&offspring1, subtree1, &offspring2, rng);

        let clone1 = offspring1.clone_subtree(subtree1);
        let clone2 = offspring2.clone_subtree(subtree2);
        offspring1.substitute(subtree1, clone2);
        offspring2.substitute(subtree2, clone1);

        if offspring1.height() > offspring1.max_height() {
            warn!(
                "crossover bloat: offspring height {} exceeds limit {}",
                offspring1.height(),
                offspring1.max_height()
            );
        }
        if offspring2.height() > offspring2.max_height() {
            warn!(
                "crossover bloat: offspring height {} exceeds limit {}",
                offspring2.height(),
                offspring2.max_height()
            );
        }

        (offspring1, offspring2)
    }

    /// Pick the exchange point in the second offspring.
    ///
    /// Under bloat control the pick is bounded two ways: its depth must
    /// leave room for the first subtree's height in the second tree, and
    /// its height must fit the slot the first subtree vacates in the
    /// first tree. When no node satisfies the bounds (including the case
    /// where a budget goes negative) the pick falls back to an
    /// unconstrained one, which may produce a logged bloat event.
    fn pick_second<R: Rng>(
        &self,
        offspring1: &ExpressionTree,
        subtree1: NodeId,
        offspring2: &ExpressionTree,
        rng: &mut R,
    ) -> NodeId {
        if self.allow_bloat {
            return offspring2.random_node(rng);
        }

        let height1 = offspring1.node_height(subtree1);
        let depth1 = offspring1.node_depth(subtree1);
        let max_depth = offspring2.max_height().checked_sub(height1);
        let max_height = offspring1.max_height().checked_sub(depth1);

        let bounded = match (max_depth, max_height) {
            (Some(max_depth), Some(max_height)) => offspring2
                .random_node_bounded(max_depth, max_height, rng)
                .ok(),
            _ => None,
        };
        bounded.unwrap_or_else(|| {
            warn!(
                "crossover: no node fits the exchange budget \
                 (subtree height {height1}, depth {depth1}); picking unconstrained"
            );
            offspring2.random_node(rng)
        })
    }
}
