//! Uncertainty propagation by the partial-derivative method.
//!
//! Provides:
//! - Measurements (nominal value ± standard error) and input sets
//! - Propagation through any `Expression` with independent input errors
//! - Per-variable contribution reports

pub mod types;
pub mod options;
pub mod propagator;

#[cfg(test)]
mod tests;

pub use options::{ExtraSymbols, PropagationOptions};
pub use propagator::{explain, propagate, propagate_report, propagate_str, propagate_with};
pub use types::{Contribution, Inputs, Measurement, PropagationReport};
