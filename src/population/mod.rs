//! Population container
//!
//! An ordered collection of expression trees sharing one set of growth
//! parameters, created by ramped half-and-half initialization and fully
//! replaced each generation.

use std::sync::Arc;

use rand::Rng;

use crate::tree::expr::ExpressionTree;
use crate::tree::params::TreeInitParameters;

/// A population of candidate programs.
#[derive(Clone, Debug)]
pub struct Population {
    individuals: Vec<ExpressionTree>,
    params: Arc<TreeInitParameters>,
}

impl Population {
    /// Initialize with ramped half-and-half growth.
    ///
    /// About half of the trees are built with the full method
    /// (`p_full = 1.0`); the rest use the grow method with probability
    /// `p_grow` of expanding each child slot. `init_depth` is the target
    /// height, clamped by each tree to `max_height`.
    pub fn ramped_half_and_half<R: Rng>(
        size: usize,
        params: Arc<TreeInitParameters>,
        max_height: usize,
        init_depth: usize,
        p_grow: f64,
        rng: &mut R,
    ) -> Self {
        let individuals = (0..size)
            .map(|_| {
                let p_full = if rng.gen::<f64>() < 0.5 { 1.0 } else { p_grow };
                ExpressionTree::random(
                    Arc::clone(&params),
                    max_height,
                    init_depth,
                    p_full,
                    rng,
                )
            })
            .collect();
        Self {
            individuals,
            params,
        }
    }

    /// Build a population from explicit individuals
    pub fn from_individuals(
        individuals: Vec<ExpressionTree>,
        params: Arc<TreeInitParameters>,
    ) -> Self {
        Self {
            individuals,
            params,
        }
    }

    /// The shared growth parameters
    pub fn params(&self) -> &Arc<TreeInitParameters> {
        &self.params
    }

    /// Number of individuals
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population has no individuals
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Borrow an individual by position
    pub fn get(&self, index: usize) -> Option<&ExpressionTree> {
        self.individuals.get(index)
    }

    /// Iterate over the individuals in order
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionTree> {
        self.individuals.iter()
    }

    /// Iterate mutably over the individuals in order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ExpressionTree> {
        self.individuals.iter_mut()
    }

    /// The ordered individual list
    pub fn individuals(&self) -> &[ExpressionTree] {
        &self.individuals
    }

    /// Mutable access to the individual list (used by ranking)
    pub(crate) fn individuals_mut(&mut self) -> &mut Vec<ExpressionTree> {
        &mut self.individuals
    }

    /// Replace the whole individual list with the next generation
    pub fn replace(&mut self, next_generation: Vec<ExpressionTree>) {
        self.individuals = next_generation;
    }

    /// The evaluated individual with the lowest fitness, if any
    pub fn best(&self) -> Option<&ExpressionTree> {
        self.individuals
            .iter()
            .filter(|t| t.fitness().is_some())
            .min_by(|a, b| {
                let fa = a.fitness().unwrap_or(f64::INFINITY);
                let fb = b.fitness().unwrap_or(f64::INFINITY);
                fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Mean fitness over the evaluated individuals
    pub fn mean_fitness(&self) -> Option<f64> {
        let evaluated: Vec<f64> = self.individuals.iter().filter_map(|t| t.fitness()).collect();
        if evaluated.is_empty() {
            None
        } else {
            Some(evaluated.iter().sum::<f64>() / evaluated.len() as f64)
        }
    }
}
