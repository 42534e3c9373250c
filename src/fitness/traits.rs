//! Fitness traits
//!
//! The engine treats fitness as an externally supplied cost: a function
//! of an individual and an opaque dataset yielding a scalar error to
//! minimize.

use crate::error::EvalError;
use crate::tree::expr::ExpressionTree;

/// An externally supplied cost function.
///
/// Lower is better; the engine minimizes. The dataset type is opaque to
/// the evolution loop, which never inspects its contents. Errors are a
/// valid outcome (the evaluator scores them as worst-possible fitness).
pub trait CostFunction: Send + Sync {
    /// The dataset the cost is computed against
    type Data;

    /// Compute the cost of one individual against a dataset
    fn cost(&self, individual: &ExpressionTree, data: &Self::Data) -> Result<f64, EvalError>;
}

/// A closure wrapper implementing [`CostFunction`]
pub struct FnCost<D, F>
where
    F: Fn(&ExpressionTree, &D) -> Result<f64, EvalError>,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&D)>,
}

impl<D, F> FnCost<D, F>
where
    F: Fn(&ExpressionTree, &D) -> Result<f64, EvalError>,
{
    /// Wrap a closure as a cost function
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<D, F> CostFunction for FnCost<D, F>
where
    F: Fn(&ExpressionTree, &D) -> Result<f64, EvalError> + Send + Sync,
{
    type Data = D;

    fn cost(&self, individual: &ExpressionTree, data: &Self::Data) -> Result<f64, EvalError> {
        (self.f)(individual, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::params::{FunctionSymbol, TreeInitParameters};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn random_tree(seed: u64) -> ExpressionTree {
        let params = Arc::new(
            TreeInitParameters::new(
                vec!["x".to_string()],
                vec![FunctionSymbol::new("add", 2)],
            )
            .unwrap(),
        );
        let mut rng = StdRng::seed_from_u64(seed);
        ExpressionTree::random(params, 3, 3, 1.0, &mut rng)
    }

    #[test]
    fn test_fn_cost_forwards_to_closure() {
        let cost = FnCost::new(|tree: &ExpressionTree, _: &()| Ok(tree.height() as f64));
        let tree = random_tree(1);
        assert_eq!(cost.cost(&tree, &()).unwrap(), 3.0);
    }

    #[test]
    fn test_fn_cost_propagates_errors() {
        let cost = FnCost::new(|_: &ExpressionTree, _: &()| {
            Err(EvalError::UnknownVariable("z".to_string()))
        });
        let tree = random_tree(2);
        assert!(cost.cost(&tree, &()).is_err());
    }
}
