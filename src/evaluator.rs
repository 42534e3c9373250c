//! Fitness evaluation and parent selection
//!
//! Wraps an externally supplied cost function with training and testing
//! datasets, ranks populations by training error, and selects parents
//! by k-tournament with greedy overselection.

use log::debug;
use rand::Rng;

use crate::fitness::traits::CostFunction;
use crate::population::Population;
use crate::tree::expr::ExpressionTree;

/// Fraction of a ranked population considered the "good" group for
/// overselection
pub const OVERSELECTION_BOUNDARY: f64 = 0.32;

/// Probability that a tournament draws from the good group
const GOOD_POOL_PROBABILITY: f64 = 0.8;

/// Evaluator: the fitness boundary of the engine.
///
/// Fitness is a minimized scalar. A cost function that fails (or yields
/// NaN) scores `f64::INFINITY` rather than aborting the generation.
pub struct Evaluator<C: CostFunction> {
    cost: C,
    training: C::Data,
    testing: C::Data,
    tournament_k: usize,
}

impl<C: CostFunction> Evaluator<C> {
    /// Create an evaluator over training and held-out testing data
    pub fn new(cost: C, training: C::Data, testing: C::Data) -> Self {
        Self {
            cost,
            training,
            testing,
            tournament_k: 2,
        }
    }

    /// Set the tournament arity (default 2)
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        assert!(k >= 1, "Tournament size must be at least 1");
        self.tournament_k = k;
        self
    }

    /// The configured tournament arity
    pub fn tournament_size(&self) -> usize {
        self.tournament_k
    }

    /// Evaluate one individual against the training data, store the
    /// result on the individual, and return it.
    pub fn evaluate(&self, individual: &mut ExpressionTree) -> f64 {
        let fitness = self.score(individual, &self.training);
        individual.set_fitness(fitness);
        fitness
    }

    /// Evaluate every individual in the population
    pub fn evaluate_population(&self, population: &mut Population) {
        for individual in population.iter_mut() {
            self.evaluate(individual);
        }
    }

    /// Evaluate every individual, then sort the population ascending by
    /// fitness (stable, so equal keys keep their relative order).
    pub fn rank(&self, population: &mut Population) {
        self.evaluate_population(population);
        population.individuals_mut().sort_by(|a, b| {
            let fa = a.fitness().unwrap_or(f64::INFINITY);
            let fb = b.fitness().unwrap_or(f64::INFINITY);
            fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Tournament selection with greedy overselection.
    ///
    /// Expects a ranked population: 80% of the time the candidate pool
    /// is the top 32% of individuals, otherwise the remaining 68%. When
    /// the chosen partition is empty (tiny populations) the whole
    /// population is used. `k` candidates are drawn uniformly with
    /// replacement and the lowest-fitness one wins.
    pub fn select<'a, R: Rng>(
        &self,
        population: &'a Population,
        rng: &mut R,
    ) -> &'a ExpressionTree {
        assert!(!population.is_empty(), "Population cannot be empty");

        let individuals = population.individuals();
        let boundary = (OVERSELECTION_BOUNDARY * individuals.len() as f64) as usize;

        let pool = if rng.gen::<f64>() < GOOD_POOL_PROBABILITY {
            &individuals[..boundary]
        } else {
            &individuals[boundary..]
        };
        let pool = if pool.is_empty() { individuals } else { pool };

        self.k_tournament(pool, rng)
    }

    /// Argmin-by-fitness over `k` candidates drawn with replacement
    fn k_tournament<'a, R: Rng>(
        &self,
        pool: &'a [ExpressionTree],
        rng: &mut R,
    ) -> &'a ExpressionTree {
        (0..self.tournament_k)
            .map(|_| &pool[rng.gen_range(0..pool.len())])
            .min_by(|a, b| {
                let fa = a.fitness().unwrap_or(f64::INFINITY);
                let fb = b.fitness().unwrap_or(f64::INFINITY);
                fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or_else(|| unreachable!("tournament size is validated >= 1"))
    }

    /// Error of an individual against the held-out testing data.
    ///
    /// Does not touch the individual's cached fitness.
    pub fn testing_error(&self, individual: &ExpressionTree) -> f64 {
        self.score(individual, &self.testing)
    }

    fn score(&self, individual: &ExpressionTree, data: &C::Data) -> f64 {
        match self.cost.cost(individual, data) {
            Ok(cost) if !cost.is_nan() => cost,
            Ok(_) => f64::INFINITY,
            Err(err) => {
                debug!("fitness evaluation failed ({err}); scoring worst fitness");
                f64::INFINITY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::fitness::traits::FnCost;
    use crate::tree::expr::Subtree;
    use crate::tree::node::Terminal;
    use crate::tree::params::{FunctionSymbol, TreeInitParameters};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn params() -> Arc<TreeInitParameters> {
        Arc::new(
            TreeInitParameters::new(
                vec!["x".to_string()],
                vec![FunctionSymbol::new("add", 2)],
            )
            .unwrap(),
        )
    }

    /// A population of single-constant trees with the given values, so
    /// fitness assignments are easy to follow.
    fn constant_population(values: &[f64]) -> Population {
        let params = params();
        let individuals = values
            .iter()
            .map(|&v| {
                ExpressionTree::from_subtree(
                    Arc::clone(&params),
                    3,
                    Subtree::terminal(Terminal::Constant(v)),
                )
            })
            .collect();
        Population::from_individuals(individuals, params)
    }

    /// Cost = the constant at the tree's root (minimization target)
    fn root_constant_cost() -> FnCost<(), impl Fn(&ExpressionTree, &()) -> Result<f64, EvalError>>
    {
        FnCost::new(|tree: &ExpressionTree, _: &()| {
            let expr = tree.expression();
            Ok(expr.parse::<f64>().unwrap_or(0.0))
        })
    }

    #[test]
    fn test_evaluate_stores_fitness() {
        let evaluator = Evaluator::new(root_constant_cost(), (), ());
        let population = constant_population(&[7.0]);

        let mut tree = population.individuals()[0].clone();
        assert!(tree.fitness().is_none());
        let fitness = evaluator.evaluate(&mut tree);
        assert_eq!(fitness, 7.0);
        assert_eq!(tree.fitness(), Some(7.0));
    }

    #[test]
    fn test_evaluation_failure_scores_worst() {
        let failing = FnCost::new(|_: &ExpressionTree, _: &()| {
            Err(EvalError::UnknownVariable("x".to_string()))
        });
        let evaluator = Evaluator::new(failing, (), ());
        let mut population = constant_population(&[1.0]);

        evaluator.evaluate_population(&mut population);
        assert_eq!(population.individuals()[0].fitness(), Some(f64::INFINITY));
    }

    #[test]
    fn test_nan_cost_scores_worst() {
        let nan_cost = FnCost::new(|_: &ExpressionTree, _: &()| Ok(f64::NAN));
        let evaluator = Evaluator::new(nan_cost, (), ());
        let mut population = constant_population(&[1.0]);

        evaluator.evaluate_population(&mut population);
        assert_eq!(population.individuals()[0].fitness(), Some(f64::INFINITY));
    }

    #[test]
    fn test_rank_sorts_ascending() {
        let evaluator = Evaluator::new(root_constant_cost(), (), ());
        let mut population = constant_population(&[3.0, 1.0, 2.0]);

        evaluator.rank(&mut population);

        let fitnesses: Vec<f64> = population
            .iter()
            .map(|t| t.fitness().unwrap())
            .collect();
        assert_eq!(fitnesses, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rank_is_stable_on_equal_keys() {
        let zero_cost = FnCost::new(|_: &ExpressionTree, _: &()| Ok(0.0));
        let evaluator = Evaluator::new(zero_cost, (), ());
        let mut population = constant_population(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let order_before: Vec<String> =
            population.iter().map(ExpressionTree::expression).collect();

        evaluator.rank(&mut population);

        let order_after: Vec<String> =
            population.iter().map(ExpressionTree::expression).collect();
        assert_eq!(order_after, order_before);
    }

    #[test]
    fn test_select_returns_argmin_of_sample() {
        // Tournament over the whole pool: the winner can never be worse
        // than every candidate it was drawn against. With k equal to a
        // large number relative to the pool, the best individual almost
        // surely appears in the sample.
        let mut rng = StdRng::seed_from_u64(1);
        let evaluator = Evaluator::new(root_constant_cost(), (), ()).with_tournament_size(64);
        let mut population = constant_population(&[4.0, 2.0, 9.0]);
        evaluator.rank(&mut population);

        for _ in 0..20 {
            let winner = evaluator.select(&population, &mut rng);
            assert_eq!(winner.fitness(), Some(2.0));
        }
    }

    #[test]
    fn test_select_single_individual() {
        // Overselection on a 1-element population: the good partition is
        // empty, so selection falls back to the whole list
        let mut rng = StdRng::seed_from_u64(2);
        let evaluator = Evaluator::new(root_constant_cost(), (), ());
        let mut population = constant_population(&[1.5]);
        evaluator.rank(&mut population);

        let winner = evaluator.select(&population, &mut rng);
        assert_eq!(winner.fitness(), Some(1.5));
    }

    #[test]
    fn test_select_prefers_good_group() {
        // 100 individuals ranked 0..100: the top 32 should win most
        // tournaments under overselection
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let evaluator = Evaluator::new(root_constant_cost(), (), ());
        let mut population = constant_population(&values);
        evaluator.rank(&mut population);

        let trials = 2000;
        let mut from_good = 0usize;
        for _ in 0..trials {
            let winner = evaluator.select(&population, &mut rng);
            if winner.fitness().unwrap() < 32.0 {
                from_good += 1;
            }
        }
        let ratio = from_good as f64 / trials as f64;
        assert!(ratio > 0.75, "good-group ratio {ratio}");
    }

    #[test]
    fn test_testing_error_does_not_cache() {
        let cost = FnCost::new(|tree: &ExpressionTree, data: &f64| {
            let v = tree.expression().parse::<f64>().unwrap_or(0.0);
            Ok((v - data).abs())
        });
        let evaluator = Evaluator::new(cost, 0.0, 10.0);
        let population = constant_population(&[4.0]);
        let tree = &population.individuals()[0];

        assert_eq!(evaluator.testing_error(tree), 6.0);
        assert!(tree.fitness().is_none());
    }

    #[test]
    #[should_panic(expected = "Tournament size must be at least 1")]
    fn test_zero_tournament_size_rejected() {
        let _ = Evaluator::new(root_constant_cost(), (), ()).with_tournament_size(0);
    }
}
