//! Tree growth parameters
//!
//! This module defines the immutable alphabet configuration shared by all
//! trees grown for one population.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EvolutionError;

/// A function symbol of the expression language: a name plus the number of
/// operands it takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    /// Symbol name, rendered as the call head in expressions
    pub name: String,
    /// Number of child operands
    pub arity: usize,
}

impl FunctionSymbol {
    /// Create a new function symbol
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Configuration for random tree growth.
///
/// Immutable once built; all trees of a population share one instance by
/// reference. Terminals are either named variables drawn from the terminal
/// alphabet or, with probability `p_rand`, a random numeric constant drawn
/// uniformly from `rand_bounds`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeInitParameters {
    terminals: Vec<String>,
    functions: Vec<FunctionSymbol>,
    p_rand: f64,
    rand_bounds: (f64, f64),
}

impl TreeInitParameters {
    /// Create growth parameters with no random constants.
    ///
    /// Fails if either alphabet is empty or any function symbol has
    /// arity zero.
    pub fn new(
        terminals: Vec<String>,
        functions: Vec<FunctionSymbol>,
    ) -> Result<Self, EvolutionError> {
        Self::with_random_constants(terminals, functions, 0.0, (-1.0, 1.0))
    }

    /// Create growth parameters with random-constant terminals.
    pub fn with_random_constants(
        terminals: Vec<String>,
        functions: Vec<FunctionSymbol>,
        p_rand: f64,
        rand_bounds: (f64, f64),
    ) -> Result<Self, EvolutionError> {
        if terminals.is_empty() {
            return Err(EvolutionError::Configuration(
                "terminal alphabet must not be empty".to_string(),
            ));
        }
        if functions.is_empty() {
            return Err(EvolutionError::Configuration(
                "function alphabet must not be empty".to_string(),
            ));
        }
        if let Some(f) = functions.iter().find(|f| f.arity == 0) {
            return Err(EvolutionError::Configuration(format!(
                "function '{}' has arity 0; function symbols must take at least one operand",
                f.name
            )));
        }
        if !(0.0..=1.0).contains(&p_rand) {
            return Err(EvolutionError::Configuration(format!(
                "p_rand must be in [0, 1], got {p_rand}"
            )));
        }
        if rand_bounds.0 > rand_bounds.1 {
            return Err(EvolutionError::Configuration(format!(
                "random-constant bounds are inverted: [{}, {}]",
                rand_bounds.0, rand_bounds.1
            )));
        }
        Ok(Self {
            terminals,
            functions,
            p_rand,
            rand_bounds,
        })
    }

    /// The terminal alphabet (variable names)
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    /// The function alphabet
    pub fn functions(&self) -> &[FunctionSymbol] {
        &self.functions
    }

    /// Probability that a grown terminal is a random constant
    pub fn p_rand(&self) -> f64 {
        self.p_rand
    }

    /// Bounds for random-constant terminals
    pub fn rand_bounds(&self) -> (f64, f64) {
        self.rand_bounds
    }

    /// Pick a terminal symbol uniformly at random
    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> &str {
        self.terminals
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_else(|| unreachable!("terminal alphabet is validated non-empty"))
    }

    /// Pick a function symbol uniformly at random
    pub fn random_function<R: Rng>(&self, rng: &mut R) -> &FunctionSymbol {
        self.functions
            .choose(rng)
            .unwrap_or_else(|| unreachable!("function alphabet is validated non-empty"))
    }

    /// Draw a random constant uniformly from the configured bounds
    pub fn random_constant<R: Rng>(&self, rng: &mut R) -> f64 {
        let (low, high) = self.rand_bounds;
        if low == high {
            low
        } else {
            rng.gen_range(low..high)
        }
    }
}
