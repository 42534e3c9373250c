//! Fitness evaluation
//!
//! The cost-function boundary plus the built-in symbolic-regression
//! stack: protected arithmetic primitives and the squared-error cost.

pub mod protected;
pub mod regression;
pub mod traits;

pub mod prelude {
    pub use super::protected::{standard_alphabet, Primitive, Primitives};
    pub use super::regression::{evaluate, RegressionData, SquaredError};
    pub use super::traits::{CostFunction, FnCost};
}
