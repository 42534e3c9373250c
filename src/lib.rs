//! # arbor-gp
//!
//! A tree-based genetic programming engine for symbolic regression.
//!
//! Candidate programs are symbolic expression trees evolved under a
//! caller-supplied cost function: subtree-exchange crossover,
//! subtree-replacement mutation, and reproduction are chosen per
//! offspring by a weighted selector, parents come from k-tournaments
//! with greedy overselection, and survival is fully generational.
//!
//! ## Core Concepts
//!
//! - **Bloat control**: crossover and mutation bound their subtree picks
//!   so offspring stay under each tree's height ceiling
//! - **Pluggable fitness**: cost is a function of (individual, dataset);
//!   the loop never inspects the dataset
//! - **Reproducibility**: all randomness flows through one seeded RNG
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arbor_gp::prelude::*;
//! use std::sync::Arc;
//!
//! let params = Arc::new(TreeInitParameters::new(
//!     vec!["x".to_string()],
//!     standard_alphabet(),
//! )?);
//!
//! let config = EvolutionConfig::default();
//! let mut rng = config.rng();
//! let mut population = config.initial_population(params, &mut rng);
//!
//! let evaluator = Evaluator::new(SquaredError::new(), training, testing);
//! let outcome = Evolution::from_config(&config)?
//!     .run(&mut population, &evaluator, &mut rng)?;
//! println!("{}", outcome.best.expression());
//! ```

pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod evolution;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod tree;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::diagnostics::{EvolutionStats, GenerationStats};
    pub use crate::error::*;
    pub use crate::evaluator::Evaluator;
    pub use crate::evolution::{Evolution, EvolutionConfig, EvolutionOutcome};
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::Population;
    pub use crate::tree::prelude::*;
}
