//! Weighted operator choice
//!
//! A cumulative-distribution sampler over the operator set: the evolution
//! loop draws one operator per offspring slot according to configured
//! weights.

use rand::Rng;

use crate::error::EvolutionError;
use crate::operators::Operator;

/// Cumulative distribution over a non-negative weight histogram.
///
/// Sampling draws a uniform value in `[0, 1)` and returns the index of
/// the first bin whose cumulative weight exceeds it, by binary search;
/// floating-point edge cases fall through to the last bin.
#[derive(Clone, Debug)]
pub struct Cdf {
    cumulative: Vec<f64>,
}

impl Cdf {
    /// Build a CDF from a weight histogram.
    ///
    /// Weights must be finite and non-negative with positive total mass.
    pub fn new(weights: &[f64]) -> Result<Self, EvolutionError> {
        if weights.is_empty() {
            return Err(EvolutionError::Configuration(
                "weight histogram must not be empty".to_string(),
            ));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(EvolutionError::Configuration(format!(
                "weights must be finite and non-negative, got {w}"
            )));
        }
        let mass: f64 = weights.iter().sum();
        if mass <= 0.0 {
            return Err(EvolutionError::Configuration(
                "weight histogram must have positive total mass".to_string(),
            ));
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut acc = 0.0;
        for w in weights {
            acc += w / mass;
            cumulative.push(acc);
        }
        Ok(Self { cumulative })
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Whether the histogram has no bins (never true for built values)
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Sample a bin index
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let u = rng.gen::<f64>();
        let index = self.cumulative.partition_point(|&c| c <= u);
        index.min(self.cumulative.len() - 1)
    }
}

/// Weighted random chooser over the fixed operator set.
#[derive(Clone, Debug)]
pub struct OperatorSelector {
    operators: Vec<Operator>,
    cdf: Cdf,
}

impl OperatorSelector {
    /// Build a selector from parallel operator and weight lists.
    pub fn new(operators: Vec<Operator>, weights: &[f64]) -> Result<Self, EvolutionError> {
        if operators.len() != weights.len() {
            return Err(EvolutionError::Configuration(format!(
                "{} operators but {} weights",
                operators.len(),
                weights.len()
            )));
        }
        let cdf = Cdf::new(weights)?;
        Ok(Self { operators, cdf })
    }

    /// The operator list, in histogram order
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Draw one operator according to the weights
    pub fn select<R: Rng>(&self, rng: &mut R) -> &Operator {
        &self.operators[self.cdf.sample(rng)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{Crossover, Mutation, Reproduction};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn standard_set() -> Vec<Operator> {
        vec![
            Operator::Reproduction(Reproduction::new()),
            Operator::Crossover(Crossover::new()),
            Operator::Mutation(Mutation::new()),
        ]
    }

    #[test]
    fn test_cdf_rejects_empty() {
        assert!(Cdf::new(&[]).is_err());
    }

    #[test]
    fn test_cdf_rejects_negative_weight() {
        assert!(Cdf::new(&[0.5, -0.1]).is_err());
    }

    #[test]
    fn test_cdf_rejects_non_finite_weight() {
        assert!(Cdf::new(&[0.5, f64::NAN]).is_err());
        assert!(Cdf::new(&[0.5, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_cdf_rejects_zero_mass() {
        assert!(Cdf::new(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_cdf_sample_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let cdf = Cdf::new(&[1.0, 2.0, 3.0]).unwrap();
        for _ in 0..1000 {
            assert!(cdf.sample(&mut rng) < 3);
        }
    }

    #[test]
    fn test_cdf_zero_weight_bin_never_sampled() {
        let mut rng = StdRng::seed_from_u64(2);
        let cdf = Cdf::new(&[0.0, 1.0, 0.0]).unwrap();
        for _ in 0..1000 {
            assert_eq!(cdf.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_cdf_sampling_tracks_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let cdf = Cdf::new(&[1.0, 3.0]).unwrap();
        let mut counts = [0usize; 2];
        let trials = 10_000;
        for _ in 0..trials {
            counts[cdf.sample(&mut rng)] += 1;
        }
        let ratio = counts[1] as f64 / trials as f64;
        assert!(ratio > 0.70 && ratio < 0.80, "ratio {ratio}");
    }

    #[test]
    fn test_selector_length_mismatch_rejected() {
        let result = OperatorSelector::new(standard_set(), &[0.5, 0.5]);
        assert!(result.is_err());
    }

    #[test]
    fn test_selector_crossover_only() {
        let mut rng = StdRng::seed_from_u64(4);
        let selector = OperatorSelector::new(standard_set(), &[0.0, 1.0, 0.0]).unwrap();
        for _ in 0..500 {
            assert!(matches!(selector.select(&mut rng), Operator::Crossover(_)));
        }
    }

    #[test]
    fn test_selector_weights_normalized_internally() {
        // Weights need not sum to one
        let mut rng = StdRng::seed_from_u64(5);
        let selector = OperatorSelector::new(standard_set(), &[5.0, 95.0, 0.0]).unwrap();
        let mut crossovers = 0usize;
        let trials = 10_000;
        for _ in 0..trials {
            if matches!(selector.select(&mut rng), Operator::Crossover(_)) {
                crossovers += 1;
            }
        }
        let ratio = crossovers as f64 / trials as f64;
        assert!(ratio > 0.92 && ratio < 0.98, "ratio {ratio}");
    }
}
