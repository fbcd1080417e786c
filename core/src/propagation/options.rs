//! Propagation settings.

use crate::symbol::SymbolOrder;
use serde::{Deserialize, Serialize};

/// Handling of inputs that the expression does not use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraSymbols {
    /// Keep them; their partial derivative is zero so they add nothing
    #[default]
    Ignore,
    /// Fail with `UnusedVariable`
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationOptions {
    pub extra_symbols: ExtraSymbols,
    /// Reject non-finite values and negative or non-finite uncertainties
    /// before doing any work
    pub validate_inputs: bool,
    /// Order symbols are substituted and differentiated in
    pub order: SymbolOrder,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            extra_symbols: ExtraSymbols::Ignore,
            validate_inputs: true,
            order: SymbolOrder::ByName,
        }
    }
}

impl PropagationOptions {
    /// Defaults, but inputs must match the expression's variables exactly
    pub fn strict() -> Self {
        Self {
            extra_symbols: ExtraSymbols::Reject,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: SymbolOrder) -> Self {
        self.order = order;
        self
    }
}
