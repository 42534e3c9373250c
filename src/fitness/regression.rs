//! Symbolic-regression fitness
//!
//! An interpreter that evaluates expression trees against variable
//! bindings and a primitive registry, plus the sum-of-squared-errors
//! cost function used for regression experiments.

use std::collections::HashMap;

use crate::error::{EvalError, EvolutionError};
use crate::fitness::protected::Primitives;
use crate::fitness::traits::CostFunction;
use crate::tree::expr::ExpressionTree;
use crate::tree::node::{NodeId, NodeKind, Terminal};

/// Evaluate a tree against variable bindings and a primitive registry.
pub fn evaluate(
    tree: &ExpressionTree,
    bindings: &HashMap<String, f64>,
    primitives: &Primitives,
) -> Result<f64, EvalError> {
    eval_node(tree, tree.root(), bindings, primitives)
}

fn eval_node(
    tree: &ExpressionTree,
    id: NodeId,
    bindings: &HashMap<String, f64>,
    primitives: &Primitives,
) -> Result<f64, EvalError> {
    let node = tree.node(id);
    match node.kind() {
        NodeKind::Terminal(Terminal::Constant(value)) => Ok(*value),
        NodeKind::Terminal(Terminal::Variable(name)) => bindings
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        NodeKind::Function(symbol) => {
            let primitive = primitives
                .get(&symbol.name)
                .ok_or_else(|| EvalError::UnknownFunction(symbol.name.clone()))?;
            if primitive.arity() != symbol.arity {
                return Err(EvalError::ArityMismatch {
                    name: symbol.name.clone(),
                    expected: primitive.arity(),
                    actual: symbol.arity,
                });
            }
            let args = node
                .children()
                .iter()
                .map(|&child| eval_node(tree, child, bindings, primitives))
                .collect::<Result<Vec<f64>, EvalError>>()?;
            Ok(primitive.call(&args))
        }
    }
}

/// A regression sample table: named input variables and rows of
/// `(inputs, target)` pairs.
#[derive(Clone, Debug)]
pub struct RegressionData {
    variables: Vec<String>,
    samples: Vec<(Vec<f64>, f64)>,
}

impl RegressionData {
    /// Build a table, checking that every row matches the variable list.
    pub fn new(
        variables: Vec<String>,
        samples: Vec<(Vec<f64>, f64)>,
    ) -> Result<Self, EvolutionError> {
        if let Some((row, _)) = samples.iter().find(|(row, _)| row.len() != variables.len()) {
            return Err(EvolutionError::Configuration(format!(
                "sample row has {} values for {} variables",
                row.len(),
                variables.len()
            )));
        }
        Ok(Self { variables, samples })
    }

    /// Synthesize a table by applying a target function to input rows.
    pub fn from_target<F: Fn(&[f64]) -> f64>(
        variables: Vec<String>,
        inputs: Vec<Vec<f64>>,
        target: F,
    ) -> Result<Self, EvolutionError> {
        let samples = inputs
            .into_iter()
            .map(|row| {
                let y = target(&row);
                (row, y)
            })
            .collect();
        Self::new(variables, samples)
    }

    /// The input variable names
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The sample rows
    pub fn samples(&self) -> &[(Vec<f64>, f64)] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the table has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Sum of squared prediction errors over a sample table.
///
/// Non-finite accumulation short-circuits to `f64::INFINITY`, the
/// worst-possible cost.
#[derive(Clone, Debug)]
pub struct SquaredError {
    primitives: Primitives,
}

impl SquaredError {
    /// Squared-error cost over the standard protected primitives
    pub fn new() -> Self {
        Self {
            primitives: Primitives::standard(),
        }
    }

    /// Squared-error cost over a custom primitive registry
    pub fn with_primitives(primitives: Primitives) -> Self {
        Self { primitives }
    }
}

impl Default for SquaredError {
    fn default() -> Self {
        Self::new()
    }
}

impl CostFunction for SquaredError {
    type Data = RegressionData;

    fn cost(&self, individual: &ExpressionTree, data: &Self::Data) -> Result<f64, EvalError> {
        let mut bindings: HashMap<String, f64> = data
            .variables()
            .iter()
            .map(|name| (name.clone(), 0.0))
            .collect();

        let mut sse = 0.0;
        for (inputs, target) in data.samples() {
            for (name, value) in data.variables().iter().zip(inputs.iter()) {
                if let Some(slot) = bindings.get_mut(name) {
                    *slot = *value;
                }
            }
            let predicted = evaluate(individual, &bindings, &self.primitives)?;
            let error = predicted - target;
            sse += error * error;
            if !sse.is_finite() {
                return Ok(f64::INFINITY);
            }
        }
        Ok(sse)
    }
}
