//! Subtree-replacement mutation
//!
//! Replaces a randomly chosen subtree of a deep-copied parent with a
//! freshly grown complete subtree whose height budget depends on the
//! bloat policy.

use std::sync::Arc;

use log::warn;
use rand::Rng;

use crate::tree::expr::{ExpressionTree, Subtree};

/// Subtree-replacement mutation. Arity 1.
///
/// The parent is never mutated. With `allow_bloat == false` (the
/// default) the replacement's height budget is the room left under the
/// offspring's ceiling at the chosen depth; with bloat allowed it is one
/// level more than the replaced subtree's height. The replacement is
/// always grown with the full method.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mutation {
    allow_bloat: bool,
}

impl Mutation {
    /// Create a mutation with bloat control enabled
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

    /// Mutate a parent, producing one offspring
    pub fn apply<R: Rng>(&self, parent: &ExpressionTree, rng: &mut R) -> ExpressionTree {
        let mut offspring = parent.clone();
        offspring.clear_fitness();

        let target = offspring.random_node(rng);
        let budget = if self.allow_bloat {
            offspring.node_height(target) + 1
        } else {
            offspring
                .max_height()
                .saturating_sub(offspring.node_depth(target))
        };
        // Same clamp as tree growth: the replacement alone never exceeds
        // the tree's ceiling
        let budget = budget.min(offspring.max_height());

        let params = Arc::clone(offspring.params());
        let replacement = Subtree::grow(&params, budget, 1.0, rng);
        offspring.substitute(target, replacement);

        if offspring.height() > offspring.max_height() {
            warn!(
                "mutation bloat: offspring height {} exceeds limit {}",
                offspring.height(),
                offspring.max_height()
            );
        }

        offspring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::params::{FunctionSymbol, TreeInitParameters};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> Arc<TreeInitParameters> {
        Arc::new(
            TreeInitParameters::new(
                vec!["x".to_string(), "y".to_string()],
                vec![
                    FunctionSymbol::new("add", 2),
                    FunctionSymbol::new("mul", 2),
                    FunctionSymbol::new("sin", 1),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_mutation_parent_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let parent = ExpressionTree::random(params(), 5, 4, 1.0, &mut rng);
        let before = parent.expression();

        for _ in 0..20 {
            let _ = Mutation::new().apply(&parent, &mut rng);
        }

        assert_eq!(parent.expression(), before);
    }

    #[test]
    fn test_mutation_respects_height_limit() {
        let mut rng = StdRng::seed_from_u64(2);
        let params = params();
        let mutation = Mutation::new();

        for _ in 0..200 {
            let parent = ExpressionTree::random(Arc::clone(&params), 5, 5, 0.7, &mut rng);
            let offspring = mutation.apply(&parent, &mut rng);
            assert!(offspring.height() <= offspring.max_height());
        }
    }

    #[test]
    fn test_mutation_offspring_fitness_cleared() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut parent = ExpressionTree::random(params(), 5, 3, 1.0, &mut rng);
        parent.set_fitness(0.5);

        let offspring = Mutation::new().apply(&parent, &mut rng);
        assert!(offspring.fitness().is_none());
    }

    #[test]
    fn test_mutation_with_bloat_stays_near_replaced_height() {
        // With bloat allowed the replacement budget is height + 1, which
        // the growth clamp still caps at the tree ceiling; the offspring
        // can exceed the ceiling by at most the replaced node's depth.
        let mut rng = StdRng::seed_from_u64(4);
        let params = params();
        let mutation = Mutation::new().with_bloat(true);

        for _ in 0..100 {
            let parent = ExpressionTree::random(Arc::clone(&params), 4, 4, 1.0, &mut rng);
            let offspring = mutation.apply(&parent, &mut rng);
            assert!(offspring.height() <= 2 * offspring.max_height());
        }
    }

    #[test]
    fn test_mutation_changes_structure_eventually() {
        let mut rng = StdRng::seed_from_u64(5);
        let parent = ExpressionTree::random(params(), 5, 4, 1.0, &mut rng);

        let mutation = Mutation::new();
        let mut saw_change = false;
        for _ in 0..50 {
            if mutation.apply(&parent, &mut rng).expression() != parent.expression() {
                saw_change = true;
                break;
            }
        }
        assert!(saw_change);
    }
}
