//! Error types for arbor-gp
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for structural tree operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    /// A function node was built with the wrong number of children.
    ///
    /// This indicates a malformed function alphabet and is never
    /// recoverable: construction refuses to proceed.
    #[error("function '{name}' expects {expected} children, got {actual}")]
    InvalidArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A bounded random node pick found no node within the requested
    /// depth/height bounds.
    ///
    /// Recoverable by caller policy: retry with looser bounds or fall
    /// back to an unconstrained pick. A node outside the bounds is
    /// never silently returned.
    #[error(
        "no node with depth <= {max_depth} and height <= {max_height} ({valid} of {total} nodes eligible)"
    )]
    EmptySelection {
        max_depth: usize,
        max_height: usize,
        total: usize,
        valid: usize,
    },
}

/// Error type for expression interpretation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A variable terminal has no binding in the evaluation context
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A function symbol has no registered primitive
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A function symbol's arity disagrees with its registered primitive
    #[error("function '{name}' called with {actual} arguments, primitive takes {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Top-level error type for evolution runs
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Structural tree error
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Expression interpretation error
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type GpResult<T> = Result<T, EvolutionError>;
