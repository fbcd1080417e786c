//! Named variables and the order they are processed in.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A named variable identifier.
///
/// Ordering is lexicographic on the name, so a `BTreeMap<Symbol, _>` iterates
/// in the same order the propagator uses by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Total order applied to symbols before substitution and differentiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOrder {
    /// Lexicographic on the symbol name
    #[default]
    ByName,
    /// Reverse lexicographic on the symbol name
    ByNameDescending,
}

impl SymbolOrder {
    pub fn compare(&self, a: &Symbol, b: &Symbol) -> Ordering {
        match self {
            Self::ByName => a.name().cmp(b.name()),
            Self::ByNameDescending => b.name().cmp(a.name()),
        }
    }

    /// Sort symbols in place according to this order
    pub fn sort(&self, symbols: &mut [Symbol]) {
        symbols.sort_by(|a, b| self.compare(a, b));
    }
}
