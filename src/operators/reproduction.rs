//! Reproduction operator
//!
//! Copies an individual into the next generation unchanged.

use crate::tree::expr::ExpressionTree;

/// Reproduction: a single deep copy of the parent, structure and cached
/// fitness intact. Arity 1, no bloat risk.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reproduction;

impl Reproduction {
    /// Create a new reproduction operator
    pub fn new() -> Self {
        Self
    }

    /// Clone the parent into an independent offspring
    pub fn apply(&self, parent: &ExpressionTree) -> ExpressionTree {
        parent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::expr::Subtree;
    use crate::tree::node::Terminal;
    use crate::tree::params::{FunctionSymbol, TreeInitParameters};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn random_tree(seed: u64) -> ExpressionTree {
        let params = Arc::new(
            TreeInitParameters::new(
                vec!["x".to_string(), "y".to_string()],
                vec![FunctionSymbol::new("add", 2), FunctionSymbol::new("sin", 1)],
            )
            .unwrap(),
        );
        let mut rng = StdRng::seed_from_u64(seed);
        ExpressionTree::random(params, 4, 3, 1.0, &mut rng)
    }

    #[test]
    fn test_reproduction_preserves_expression() {
        let parent = random_tree(1);
        let offspring = Reproduction::new().apply(&parent);
        assert_eq!(offspring.expression(), parent.expression());
    }

    #[test]
    fn test_reproduction_offspring_is_independent() {
        let mut rng = StdRng::seed_from_u64(2);
        let parent = random_tree(2);
        let before = parent.expression();

        let mut offspring = Reproduction::new().apply(&parent);
        let target = offspring.random_node(&mut rng);
        offspring.substitute(target, Subtree::terminal(Terminal::Constant(0.0)));

        assert_eq!(parent.expression(), before);
    }

    #[test]
    fn test_reproduction_keeps_cached_fitness() {
        let mut parent = random_tree(3);
        parent.set_fitness(0.25);
        let offspring = Reproduction::new().apply(&parent);
        assert_eq!(offspring.fitness(), Some(0.25));
    }
}
