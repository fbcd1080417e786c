//! Numeric evaluation of expressions.

use super::{BinaryOperator, Expr, Function};
use crate::symbol::Symbol;
use std::collections::BTreeMap;
use thiserror::Error;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Variable with no bound value
    #[error("Unbound variable: {0}")]
    UnboundVariable(Symbol),
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
    /// Argument outside the function's domain (e.g., sqrt of negative)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Operation produced NaN or an infinity
    #[error("Non-finite result: {0}")]
    NonFinite(String),
}

/// Concrete values for variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<Symbol, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<Symbol>, value: f64) {
        self.values.insert(symbol.into(), value);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<(S, f64)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(s, v)| (s.into(), v)).collect(),
        }
    }
}

fn finite(value: f64, what: impl FnOnce() -> String) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite(what()))
    }
}

fn apply_function(func: Function, val: f64) -> Result<f64, EvalError> {
    let invalid = |msg: &str| Err(EvalError::InvalidArgument(msg.to_string()));
    let result = match func {
        Function::Sin => val.sin(),
        Function::Cos => val.cos(),
        Function::Tan => val.tan(),
        Function::Asin | Function::Acos if !(-1.0..=1.0).contains(&val) => {
            return invalid(&format!("{} argument must be in [-1, 1]", func.name()));
        }
        Function::Asin => val.asin(),
        Function::Acos => val.acos(),
        Function::Atan => val.atan(),
        Function::Sinh => val.sinh(),
        Function::Cosh => val.cosh(),
        Function::Tanh => val.tanh(),
        Function::Sqrt if val < 0.0 => return invalid("sqrt of negative number"),
        Function::Sqrt => val.sqrt(),
        Function::Exp => val.exp(),
        Function::Ln if val <= 0.0 => return invalid("ln of non-positive number"),
        Function::Ln => val.ln(),
        Function::Log10 if val <= 0.0 => return invalid("log10 of non-positive number"),
        Function::Log10 => val.log10(),
        Function::Abs => val.abs(),
    };
    finite(result, || format!("{}({})", func.name(), val))
}

fn apply_binary(op: BinaryOperator, l: f64, r: f64) -> Result<f64, EvalError> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        BinaryOperator::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
        BinaryOperator::Pow => {
            if l == 0.0 && r < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            if l < 0.0 && r.fract() != 0.0 {
                return Err(EvalError::InvalidArgument(format!(
                    "non-integer power {} of negative base {}",
                    r, l
                )));
            }
            l.powf(r)
        }
    };
    finite(result, || format!("{} {} {}", l, op.symbol(), r))
}

/// Evaluate an expression with every variable taken from `bindings`
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Constant(c) => Ok(c.value()),
        Expr::Variable(s) => bindings
            .get(s)
            .ok_or_else(|| EvalError::UnboundVariable(s.clone())),
        Expr::BinaryOp { op, left, right } => {
            let l = evaluate(left, bindings)?;
            let r = evaluate(right, bindings)?;
            apply_binary(*op, l, r)
        }
        Expr::Neg(inner) => Ok(-evaluate(inner, bindings)?),
        Expr::Call { func, arg } => apply_function(*func, evaluate(arg, bindings)?),
    }
}
