//! The evolution loop
//!
//! Drives a fixed number of generations with fully generational
//! replacement: rank, record the best, fill a new generation through
//! weighted operator choice and tournament selection, replace. The
//! result is the best individual observed over the whole run, not
//! merely the last generation's best.

use std::sync::Arc;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::diagnostics::{EvolutionStats, GenerationStats};
use crate::error::{EvolutionError, GpResult};
use crate::evaluator::Evaluator;
use crate::fitness::traits::CostFunction;
use crate::operators::{Crossover, Mutation, Operator, OperatorSelector, Reproduction};
use crate::population::Population;
use crate::tree::expr::ExpressionTree;
use crate::tree::params::TreeInitParameters;

/// Configuration surface of a run.
///
/// Defaults follow the original symbolic-regression experiments:
/// population 100, max height 15, init depth 4, operator weights
/// (0, 0.95, 0.05), binary tournaments, 30 generations, bloat
/// disallowed.
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Hard height ceiling for every tree
    pub max_height: usize,
    /// Target height for initial growth
    pub init_depth: usize,
    /// Grow-method expansion probability for the non-full half of
    /// ramped half-and-half initialization
    pub p_grow: f64,
    /// Reproduction weight
    pub reproduction_weight: f64,
    /// Crossover weight
    pub crossover_weight: f64,
    /// Mutation weight
    pub mutation_weight: f64,
    /// Tournament arity
    pub tournament_k: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Whether crossover offspring may exceed the height ceiling
    pub crossover_bloat: bool,
    /// Whether mutation offspring may exceed the height ceiling
    pub mutation_bloat: bool,
    /// RNG seed; a fixed seed reproduces the run exactly
    pub seed: u64,
    /// Report each generation's best through the logger
    pub verbose: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_height: 15,
            init_depth: 4,
            p_grow: 0.5,
            reproduction_weight: 0.0,
            crossover_weight: 0.95,
            mutation_weight: 0.05,
            tournament_k: 2,
            generations: 30,
            crossover_bloat: false,
            mutation_bloat: false,
            seed: 0,
            verbose: true,
        }
    }
}

impl EvolutionConfig {
    /// Check the numeric constraints on the configuration
    pub fn validate(&self) -> GpResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "population size must be at least 1".to_string(),
            ));
        }
        if self.generations == 0 {
            return Err(EvolutionError::Configuration(
                "generation count must be at least 1".to_string(),
            ));
        }
        if self.tournament_k == 0 {
            return Err(EvolutionError::Configuration(
                "tournament size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.p_grow) {
            return Err(EvolutionError::Configuration(format!(
                "p_grow must be in [0, 1], got {}",
                self.p_grow
            )));
        }
        // Weight constraints are enforced by the selector
        self.operator_selector().map(|_| ())
    }

    /// Build the weighted operator set this configuration describes
    pub fn operator_selector(&self) -> GpResult<OperatorSelector> {
        let operators = vec![
            Operator::Reproduction(Reproduction::new()),
            Operator::Crossover(Crossover::new().with_bloat(self.crossover_bloat)),
            Operator::Mutation(Mutation::new().with_bloat(self.mutation_bloat)),
        ];
        OperatorSelector::new(
            operators,
            &[
                self.reproduction_weight,
                self.crossover_weight,
                self.mutation_weight,
            ],
        )
    }

    /// Grow the initial population for this configuration
    pub fn initial_population<R: Rng>(
        &self,
        params: Arc<TreeInitParameters>,
        rng: &mut R,
    ) -> Population {
        Population::ramped_half_and_half(
            self.population_size,
            params,
            self.max_height,
            self.init_depth,
            self.p_grow,
            rng,
        )
    }

    /// The seeded RNG for this configuration
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// Result of a completed run
#[derive(Clone, Debug)]
pub struct EvolutionOutcome {
    /// Best individual observed across all generations, re-evaluated
    pub best: ExpressionTree,
    /// Per-generation statistics
    pub stats: EvolutionStats,
}

/// The generational evolution loop.
pub struct Evolution {
    selector: OperatorSelector,
    generations: usize,
    verbose: bool,
}

impl Evolution {
    /// Create a loop over an operator set for a number of generations
    pub fn new(selector: OperatorSelector, generations: usize) -> Self {
        Self {
            selector,
            generations,
            verbose: false,
        }
    }

    /// Build a loop straight from a configuration
    pub fn from_config(config: &EvolutionConfig) -> GpResult<Self> {
        config.validate()?;
        Ok(Self {
            selector: config.operator_selector()?,
            generations: config.generations,
            verbose: config.verbose,
        })
    }

    /// Enable per-generation reporting through the logger
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Run the loop to completion.
    ///
    /// Each generation: rank, record the current best, then repeatedly
    /// draw an operator, draw as many parents as its arity requires,
    /// and append the offspring until the new generation reaches the
    /// old population's size (a final two-offspring crossover may
    /// overshoot by one). The population is then replaced in full; the
    /// best individual survives only through the best-ever record.
    pub fn run<C: CostFunction, R: Rng>(
        &self,
        population: &mut Population,
        evaluator: &Evaluator<C>,
        rng: &mut R,
    ) -> GpResult<EvolutionOutcome> {
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(EvolutionError::Configuration(
                "generation count must be at least 1".to_string(),
            ));
        }

        let mut stats = EvolutionStats::new();
        let mut best_record: Vec<ExpressionTree> = Vec::with_capacity(self.generations);

        for generation in 0..self.generations {
            evaluator.rank(population);

            let best = population
                .get(0)
                .unwrap_or_else(|| unreachable!("population is non-empty"))
                .clone();
            let snapshot = GenerationStats {
                generation,
                best_fitness: best.fitness().unwrap_or(f64::INFINITY),
                best_testing_error: evaluator.testing_error(&best),
                best_height: best.height(),
                mean_fitness: population.mean_fitness().unwrap_or(f64::INFINITY),
            };
            if self.verbose {
                info!(
                    "generation {generation}: training error {:.6e}, testing error {:.6e}, \
                     height {}, best {}",
                    snapshot.best_fitness,
                    snapshot.best_testing_error,
                    snapshot.best_height,
                    best.expression(),
                );
            }
            stats.record(snapshot);
            best_record.push(best);

            let target = population.len();
            let mut next_generation: Vec<ExpressionTree> = Vec::with_capacity(target + 1);
            while next_generation.len() < target {
                let operator = self.selector.select(rng);
                let parents: Vec<&ExpressionTree> = (0..operator.arity())
                    .map(|_| evaluator.select(population, rng))
                    .collect();
                let offspring = operator.apply(&parents, rng);
                for child in &offspring {
                    if child.height() > child.max_height() {
                        stats.count_bloat_event();
                    }
                }
                next_generation.extend(offspring);
            }
            population.replace(next_generation);
        }

        // Best over the whole run, by re-evaluated training error
        for tree in &mut best_record {
            evaluator.evaluate(tree);
        }
        best_record.sort_by(|a, b| {
            let fa = a.fitness().unwrap_or(f64::INFINITY);
            let fb = b.fitness().unwrap_or(f64::INFINITY);
            fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
        });
        let best = best_record
            .into_iter()
            .next()
            .unwrap_or_else(|| unreachable!("at least one generation ran"));

        Ok(EvolutionOutcome { best, stats })
    }
}
