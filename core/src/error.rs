//! Errors surfaced by the propagator.

use crate::expr::{EvalError, ParseError};
use crate::symbol::Symbol;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    /// A free variable of the expression has no input entry
    #[error("Missing variable: no value supplied for '{0}'")]
    MissingVariable(Symbol),

    /// An input entry names a variable the expression does not use
    #[error("Unused variable: '{0}' does not appear in the expression")]
    UnusedVariable(Symbol),

    /// The expression value is not a finite real number at the nominal point
    #[error("Non-numeric result: {0}")]
    NonNumericResult(String),

    /// A partial derivative is undefined at the nominal point
    #[error("Domain error in d/d{symbol}: {reason}")]
    DomainError { symbol: Symbol, reason: String },

    /// Negative or non-finite input value/uncertainty
    #[error("Invalid input for '{symbol}': {reason}")]
    InvalidInput { symbol: Symbol, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PropagationError {
    /// Classify a failure while evaluating the expression value
    pub(crate) fn from_value_eval(err: EvalError) -> Self {
        match err {
            EvalError::UnboundVariable(symbol) => Self::MissingVariable(symbol),
            other => Self::NonNumericResult(other.to_string()),
        }
    }

    /// Classify a failure while evaluating the partial derivative for `symbol`
    pub(crate) fn from_partial_eval(symbol: &Symbol, err: EvalError) -> Self {
        match err {
            EvalError::UnboundVariable(missing) => Self::MissingVariable(missing),
            other => Self::DomainError {
                symbol: symbol.clone(),
                reason: other.to_string(),
            },
        }
    }
}

pub type PropagationResult<T> = Result<T, PropagationError>;
