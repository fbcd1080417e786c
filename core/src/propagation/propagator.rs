//! First-order (linearized) error propagation.
//!
//! For `f(x_1, ..., x_n)` with independent inputs `x_i = v_i ± s_i`:
//!
//! ```text
//! value = f(v_1, ..., v_n)
//! error = sqrt( sum_i (df/dx_i (v) * s_i)^2 )
//! ```

use super::options::{ExtraSymbols, PropagationOptions};
use super::types::{Contribution, Inputs, Measurement, PropagationReport};
use crate::error::{PropagationError, PropagationResult};
use crate::expr::{parse_expression, Bindings, Expr, Expression};
use crate::symbol::Symbol;
use tracing::{debug, trace};

/// Propagate input uncertainties through `expression` with default options
pub fn propagate<E: Expression>(expression: &E, inputs: &Inputs) -> PropagationResult<Measurement> {
    propagate_with(expression, inputs, &PropagationOptions::default())
}

pub fn propagate_with<E: Expression>(
    expression: &E,
    inputs: &Inputs,
    options: &PropagationOptions,
) -> PropagationResult<Measurement> {
    propagate_report(expression, inputs, options).map(|report| report.result)
}

/// Parse `source` and propagate with default options
pub fn propagate_str(source: &str, inputs: &Inputs) -> PropagationResult<Measurement> {
    let expr = parse_expression(source)?;
    propagate(&expr, inputs)
}

fn validate_inputs(symbols: &[Symbol], inputs: &Inputs) -> PropagationResult<()> {
    for symbol in symbols {
        let Some(m) = inputs.get(symbol) else {
            continue;
        };
        let reason = if !m.value.is_finite() {
            format!("value {} is not finite", m.value)
        } else if !m.uncertainty.is_finite() {
            format!("uncertainty {} is not finite", m.uncertainty)
        } else if m.uncertainty < 0.0 {
            format!("uncertainty {} is negative", m.uncertainty)
        } else {
            continue;
        };
        return Err(PropagationError::InvalidInput {
            symbol: symbol.clone(),
            reason,
        });
    }
    Ok(())
}

/// Propagate and return the per-variable breakdown alongside the result
pub fn propagate_report<E: Expression>(
    expression: &E,
    inputs: &Inputs,
    options: &PropagationOptions,
) -> PropagationResult<PropagationReport<E>> {
    let mut symbols: Vec<Symbol> = inputs.symbols().cloned().collect();
    options.order.sort(&mut symbols);

    if options.validate_inputs {
        validate_inputs(&symbols, inputs)?;
    }

    let free = expression.free_symbols();
    if let Some(missing) = free
        .iter()
        .filter(|s| !inputs.contains(s))
        .min_by(|a, b| options.order.compare(a, b))
    {
        return Err(PropagationError::MissingVariable(missing.clone()));
    }

    if options.extra_symbols == ExtraSymbols::Reject {
        if let Some(extra) = symbols.iter().find(|s| !free.contains(*s)) {
            return Err(PropagationError::UnusedVariable(extra.clone()));
        }
    }

    let measurements: Vec<Measurement> = symbols
        .iter()
        .filter_map(|s| inputs.get(s).copied())
        .collect();
    let bindings: Bindings = symbols
        .iter()
        .zip(&measurements)
        .map(|(s, m)| (s.clone(), m.value))
        .collect();

    let mut variance = 0.0;
    let mut contributions = Vec::with_capacity(symbols.len());

    for (symbol, m) in symbols.into_iter().zip(measurements) {
        let derivative = expression.differentiate(&symbol);

        // A zero-error input contributes nothing, even where its partial is undefined.
        let partial = if m.uncertainty == 0.0 {
            None
        } else {
            let value = derivative
                .evaluate(&bindings)
                .map_err(|e| PropagationError::from_partial_eval(&symbol, e))?;
            Some(value)
        };

        let weighted = partial.map_or(0.0, |p| (p * m.uncertainty).abs());
        trace!(symbol = %symbol, ?partial, sigma = m.uncertainty, weighted, "partial derivative");
        variance += weighted * weighted;

        contributions.push(Contribution {
            symbol,
            derivative,
            partial,
            uncertainty: m.uncertainty,
            weighted,
        });
    }

    let value = expression
        .evaluate(&bindings)
        .map_err(PropagationError::from_value_eval)?;

    let error = variance.sqrt();
    if !error.is_finite() {
        return Err(PropagationError::NonNumericResult(format!(
            "propagated uncertainty is not finite (variance {})",
            variance
        )));
    }

    debug!(
        variables = contributions.len(),
        value, error, "propagated uncertainty"
    );

    Ok(PropagationReport {
        result: Measurement::new(value, error),
        contributions,
    })
}

/// Parse `source` and return the full breakdown with default options
pub fn explain(source: &str, inputs: &Inputs) -> PropagationResult<PropagationReport<Expr>> {
    let expr = parse_expression(source)?;
    propagate_report(&expr, inputs, &PropagationOptions::default())
}
