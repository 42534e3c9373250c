//! Run diagnostics
//!
//! Per-generation statistics recorded by the evolution loop.

use serde::{Deserialize, Serialize};

/// Snapshot of one generation, taken right after ranking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index, starting at 0
    pub generation: usize,
    /// Training error of the generation's best individual
    pub best_fitness: f64,
    /// Held-out error of the generation's best individual
    pub best_testing_error: f64,
    /// Height of the generation's best individual
    pub best_height: usize,
    /// Mean training error over the population
    pub mean_fitness: f64,
}

/// Statistics accumulated over a whole run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    generations: Vec<GenerationStats>,
    bloat_events: usize,
}

impl EvolutionStats {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one generation snapshot
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// The recorded generation snapshots, in order
    pub fn generations(&self) -> &[GenerationStats] {
        &self.generations
    }

    /// Best training error per generation
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    /// Count one offspring that exceeded its height ceiling
    pub fn count_bloat_event(&mut self) {
        self.bloat_events += 1;
    }

    /// Number of offspring observed over their height ceiling
    pub fn bloat_events(&self) -> usize {
        self.bloat_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(generation: usize, best: f64) -> GenerationStats {
        GenerationStats {
            generation,
            best_fitness: best,
            best_testing_error: best * 2.0,
            best_height: 3,
            mean_fitness: best + 1.0,
        }
    }

    #[test]
    fn test_record_and_history() {
        let mut stats = EvolutionStats::new();
        stats.record(snapshot(0, 5.0));
        stats.record(snapshot(1, 3.0));

        assert_eq!(stats.generations().len(), 2);
        assert_eq!(stats.best_fitness_history(), vec![5.0, 3.0]);
    }

    #[test]
    fn test_bloat_counter() {
        let mut stats = EvolutionStats::new();
        assert_eq!(stats.bloat_events(), 0);
        stats.count_bloat_event();
        stats.count_bloat_event();
        assert_eq!(stats.bloat_events(), 2);
    }
}
