//! Genetic operators
//!
//! This module provides the reproduction, crossover, and mutation
//! operators together with the weighted selector that chooses among
//! them.

pub mod crossover;
pub mod mutation;
pub mod reproduction;
pub mod selector;

use rand::Rng;

use crate::tree::expr::ExpressionTree;

pub use crossover::Crossover;
pub use mutation::Mutation;
pub use reproduction::Reproduction;
pub use selector::{Cdf, OperatorSelector};

/// The fixed operator set of the engine.
///
/// Each operator consumes as many parents as its arity and produces one
/// or two offspring; parents are never mutated.
#[derive(Clone, Copy, Debug)]
pub enum Operator {
    /// Deep-copy a single parent (arity 1, one offspring)
    Reproduction(Reproduction),
    /// Exchange subtrees between two parents (arity 2, two offspring)
    Crossover(Crossover),
    /// Replace a subtree with a fresh random one (arity 1, one offspring)
    Mutation(Mutation),
}

impl Operator {
    /// Number of parents the operator consumes
    pub fn arity(&self) -> usize {
        match self {
            Self::Reproduction(_) | Self::Mutation(_) => 1,
            Self::Crossover(_) => 2,
        }
    }

    /// Operator name, for reporting
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reproduction(_) => "reproduction",
            Self::Crossover(_) => "crossover",
            Self::Mutation(_) => "mutation",
        }
    }

    /// Apply the operator to exactly `arity` parents.
    ///
    /// Panics if the parent count does not match the arity; the
    /// evolution loop draws the right number by construction.
    pub fn apply<R: Rng>(&self, parents: &[&ExpressionTree], rng: &mut R) -> Vec<ExpressionTree> {
        assert_eq!(
            parents.len(),
            self.arity(),
            "{} takes {} parent(s), got {}",
            self.name(),
            self.arity(),
            parents.len()
        );
        match self {
            Self::Reproduction(op) => vec![op.apply(parents[0])],
            Self::Crossover(op) => {
                let (a, b) = op.apply(parents[0], parents[1], rng);
                vec![a, b]
            }
            Self::Mutation(op) => vec![op.apply(parents[0], rng)],
        }
    }
}

pub mod prelude {
    pub use super::selector::{Cdf, OperatorSelector};
    pub use super::{Crossover, Mutation, Operator, Reproduction};
}
