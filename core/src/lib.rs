//! First-order propagation of measurement uncertainty through symbolic
//! expressions.
//!
//! ```
//! use errprop_core::{propagate_str, Inputs};
//!
//! let inputs = Inputs::new().with("x", 3.0, 0.1).with("y", 2.0, 0.2);
//! let result = propagate_str("x**2 + y", &inputs).unwrap();
//! assert!((result.value - 11.0).abs() < 1e-12);
//! assert!((result.uncertainty - 0.40f64.sqrt()).abs() < 1e-12);
//! ```

pub mod error;
pub mod expr;
pub mod propagation;
pub mod symbol;

pub use error::{PropagationError, PropagationResult};
pub use expr::{parse_expression, Expr, Expression};
pub use propagation::{
    explain, propagate, propagate_report, propagate_str, propagate_with, Inputs, Measurement,
    PropagationOptions, PropagationReport,
};
pub use symbol::{Symbol, SymbolOrder};
