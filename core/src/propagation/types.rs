//! Core types for error propagation.

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A nominal value with its standard error
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    /// Standard error (one sigma), expected to be non-negative
    pub uncertainty: f64,
}

impl Measurement {
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }

    /// A value known without error
    pub fn exact(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// Uncertainty relative to the magnitude of the value.
    ///
    /// Returns `None` when the value is zero.
    pub fn relative_uncertainty(&self) -> Option<f64> {
        if self.value == 0.0 {
            None
        } else {
            Some(self.uncertainty / self.value.abs())
        }
    }

    pub fn into_pair(self) -> (f64, f64) {
        (self.value, self.uncertainty)
    }
}

impl From<(f64, f64)> for Measurement {
    fn from((value, uncertainty): (f64, f64)) -> Self {
        Self::new(value, uncertainty)
    }
}

impl From<Measurement> for (f64, f64) {
    fn from(m: Measurement) -> Self {
        m.into_pair()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.value, p, self.uncertainty),
            None => write!(f, "{} ± {}", self.value, self.uncertainty),
        }
    }
}

/// Input measurements keyed by variable.
///
/// Serializes as a JSON object: `{"x": {"value": 3.0, "uncertainty": 0.1}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs {
    entries: BTreeMap<Symbol, Measurement>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, symbol: impl Into<Symbol>, value: f64, uncertainty: f64) -> Self {
        self.insert(symbol, Measurement::new(value, uncertainty));
        self
    }

    /// Insert or replace a measurement, returning the previous one
    pub fn insert(
        &mut self,
        symbol: impl Into<Symbol>,
        measurement: Measurement,
    ) -> Option<Measurement> {
        self.entries.insert(symbol.into(), measurement)
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<Measurement> {
        self.entries.remove(symbol)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Measurement> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Symbols in name order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Measurement)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse inputs from a JSON object keyed by variable name
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<S, M> FromIterator<(S, M)> for Inputs
where
    S: Into<Symbol>,
    M: Into<Measurement>,
{
    fn from_iter<I: IntoIterator<Item = (S, M)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(s, m)| (s.into(), m.into()))
                .collect(),
        }
    }
}

/// One variable's share of the propagated uncertainty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution<E> {
    pub symbol: Symbol,
    /// Symbolic partial derivative of the expression with respect to `symbol`
    pub derivative: E,
    /// Partial derivative at the nominal point.
    /// `None` when the input uncertainty is zero and evaluation was skipped.
    pub partial: Option<f64>,
    pub uncertainty: f64,
    /// |partial| * uncertainty
    pub weighted: f64,
}

impl<E> Contribution<E> {
    /// Term added to the variance of the result
    pub fn variance(&self) -> f64 {
        self.weighted * self.weighted
    }
}

/// Result of a propagation together with its per-variable breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationReport<E> {
    pub result: Measurement,
    /// Contributions in processing order
    pub contributions: Vec<Contribution<E>>,
}

impl<E> PropagationReport<E> {
    /// Contribution with the largest weighted uncertainty
    pub fn dominant(&self) -> Option<&Contribution<E>> {
        self.contributions
            .iter()
            .max_by(|a, b| a.weighted.total_cmp(&b.weighted))
    }

    pub fn contribution(&self, symbol: &Symbol) -> Option<&Contribution<E>> {
        self.contributions.iter().find(|c| &c.symbol == symbol)
    }
}
