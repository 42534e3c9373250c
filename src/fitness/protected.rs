//! Protected arithmetic primitives
//!
//! Total versions of the usual arithmetic and transcendental functions:
//! every primitive returns a finite value for all finite inputs, so no
//! evolved expression can fault during evaluation. Division by zero
//! yields 1.0, square root and logarithms act on the absolute value, and
//! any remaining non-finite result collapses to the protected fallback.

use std::collections::HashMap;

use crate::tree::params::FunctionSymbol;

/// Fallback for primitives whose protected result is 1.0
fn guard_one(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        1.0
    }
}

/// Fallback for primitives whose protected result is 0.0
fn guard_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Protected addition
pub fn add(x: f64, y: f64) -> f64 {
    guard_zero(x + y)
}

/// Protected subtraction
pub fn sub(x: f64, y: f64) -> f64 {
    guard_zero(x - y)
}

/// Protected multiplication
pub fn mul(x: f64, y: f64) -> f64 {
    guard_zero(x * y)
}

/// Protected division: division by zero yields 1.0
pub fn div(x: f64, y: f64) -> f64 {
    if y == 0.0 {
        1.0
    } else {
        guard_one(x / y)
    }
}

/// Protected power
pub fn pow(x: f64, y: f64) -> f64 {
    guard_one(x.powf(y))
}

/// Protected square root, taken on the absolute value
pub fn sqrt(x: f64) -> f64 {
    guard_one(x.abs().sqrt())
}

/// Protected natural logarithm, taken on the absolute value
pub fn log(x: f64) -> f64 {
    guard_one(x.abs().ln())
}

/// Protected base-10 logarithm, taken on the absolute value
pub fn log10(x: f64) -> f64 {
    guard_one(x.abs().log10())
}

/// Protected exponential
pub fn exp(x: f64) -> f64 {
    guard_one(x.exp())
}

/// Protected sine
pub fn sin(x: f64) -> f64 {
    guard_one(x.sin())
}

/// Protected cosine
pub fn cos(x: f64) -> f64 {
    guard_one(x.cos())
}

/// Protected tangent
pub fn tan(x: f64) -> f64 {
    guard_one(x.tan())
}

/// Protected absolute value
pub fn abs(x: f64) -> f64 {
    guard_one(x.abs())
}

/// Protected minimum
pub fn min(x: f64, y: f64) -> f64 {
    guard_one(x.min(y))
}

/// Protected maximum
pub fn max(x: f64, y: f64) -> f64 {
    guard_one(x.max(y))
}

/// A named primitive of fixed arity
#[derive(Clone, Copy, Debug)]
pub enum Primitive {
    /// One-argument primitive
    Unary(fn(f64) -> f64),
    /// Two-argument primitive
    Binary(fn(f64, f64) -> f64),
}

impl Primitive {
    /// Number of arguments the primitive takes
    pub fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }

    /// Apply the primitive. `args` must have exactly `arity` elements;
    /// the interpreter validates that before calling.
    pub fn call(&self, args: &[f64]) -> f64 {
        match self {
            Self::Unary(f) => f(args[0]),
            Self::Binary(f) => f(args[0], args[1]),
        }
    }
}

/// Name-indexed registry of primitives, the binding environment for
/// function symbols during expression evaluation.
#[derive(Clone, Debug)]
pub struct Primitives {
    map: HashMap<String, Primitive>,
}

impl Primitives {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// The full protected-arithmetic registry
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert("add", Primitive::Binary(add));
        registry.insert("sub", Primitive::Binary(sub));
        registry.insert("mul", Primitive::Binary(mul));
        registry.insert("div", Primitive::Binary(div));
        registry.insert("pow", Primitive::Binary(pow));
        registry.insert("sqrt", Primitive::Unary(sqrt));
        registry.insert("abs", Primitive::Unary(abs));
        registry.insert("log", Primitive::Unary(log));
        registry.insert("log10", Primitive::Unary(log10));
        registry.insert("exp", Primitive::Unary(exp));
        registry.insert("sin", Primitive::Unary(sin));
        registry.insert("cos", Primitive::Unary(cos));
        registry.insert("tan", Primitive::Unary(tan));
        registry.insert("min", Primitive::Binary(min));
        registry.insert("max", Primitive::Binary(max));
        registry
    }

    /// Register a primitive under a name
    pub fn insert(&mut self, name: impl Into<String>, primitive: Primitive) {
        self.map.insert(name.into(), primitive);
    }

    /// Look up a primitive by name
    pub fn get(&self, name: &str) -> Option<&Primitive> {
        self.map.get(name)
    }

    /// Number of registered primitives
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for Primitives {
    fn default() -> Self {
        Self::standard()
    }
}

/// The function alphabet matching [`Primitives::standard`], in the
/// order the original experiments used it.
pub fn standard_alphabet() -> Vec<FunctionSymbol> {
    vec![
        FunctionSymbol::new("add", 2),
        FunctionSymbol::new("sub", 2),
        FunctionSymbol::new("mul", 2),
        FunctionSymbol::new("div", 2),
        FunctionSymbol::new("pow", 2),
        FunctionSymbol::new("sqrt", 1),
        FunctionSymbol::new("abs", 1),
        FunctionSymbol::new("log", 1),
        FunctionSymbol::new("log10", 1),
        FunctionSymbol::new("sin", 1),
        FunctionSymbol::new("cos", 1),
        FunctionSymbol::new("tan", 1),
        FunctionSymbol::new("max", 2),
        FunctionSymbol::new("min", 2),
    ]
}
