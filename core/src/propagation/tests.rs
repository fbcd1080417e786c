//! Tests for the propagator.

use super::*;
use crate::error::PropagationError;
use crate::expr::{parse_expression, Expr};
use crate::symbol::{Symbol, SymbolOrder};

fn parse(s: &str) -> Expr {
    parse_expression(s).unwrap()
}

#[test]
fn test_square_plus_linear_scenario() {
    let inputs = Inputs::new().with("x", 3.0, 0.1).with("y", 2.0, 0.2);
    let result = propagate(&parse("x**2 + y"), &inputs).unwrap();

    assert!((result.value - 11.0).abs() < 1e-10);
    // sqrt((6.0 * 0.1)^2 + (1 * 0.2)^2) = sqrt(0.40)
    assert!((result.uncertainty - 0.40f64.sqrt()).abs() < 1e-10);
    assert!((result.uncertainty - 0.6325).abs() < 1e-4);
}

#[test]
fn test_quotient_scenario() {
    let inputs = Inputs::new().with("x", 10.0, 0.5).with("y", 2.0, 0.1);
    let result = propagate(&parse("x / y"), &inputs).unwrap();

    assert!((result.value - 5.0).abs() < 1e-10);
    // df/dx = 0.5, df/dy = -2.5
    assert!((result.uncertainty - 0.125f64.sqrt()).abs() < 1e-10);
    assert!((result.uncertainty - 0.3536).abs() < 1e-4);
}

#[test]
fn test_scaling_is_linear() {
    for a in [2.5, -4.0, 0.0] {
        let expr = Expr::num(a) * Expr::var("x");
        let inputs = Inputs::new().with("x", 1.2, 0.3);
        let result = propagate(&expr, &inputs).unwrap();
        assert!((result.value - a * 1.2).abs() < 1e-12);
        assert!((result.uncertainty - a.abs() * 0.3).abs() < 1e-12);
    }
}

#[test]
fn test_sum_adds_in_quadrature() {
    let inputs = Inputs::new().with("x", 1.0, 0.3).with("y", -7.0, 0.4);
    let result = propagate(&parse("x + y"), &inputs).unwrap();
    assert_eq!(result.uncertainty, (0.3f64 * 0.3 + 0.4 * 0.4).sqrt());
}

#[test]
fn test_zero_errors_give_zero_uncertainty() {
    let expr = parse("sin(x) * exp(y) / sqrt(z)");
    let inputs = Inputs::new()
        .with("x", 0.4, 0.0)
        .with("y", 1.1, 0.0)
        .with("z", 2.0, 0.0);
    let result = propagate(&expr, &inputs).unwrap();

    let direct = 0.4f64.sin() * 1.1f64.exp() / 2.0f64.sqrt();
    assert_eq!(result.uncertainty, 0.0);
    assert!((result.value - direct).abs() < 1e-12);
}

#[test]
fn test_zero_error_skips_singular_partial() {
    // d/dx sqrt(x) is undefined at 0, but x carries no error
    let inputs = Inputs::new().with("x", 0.0, 0.0).with("y", 1.0, 0.1);
    let result = propagate(&parse("sqrt(x) + y"), &inputs).unwrap();
    assert!((result.uncertainty - 0.1).abs() < 1e-12);
}

#[test]
fn test_order_does_not_change_result() {
    let expr = parse("a * b ^ 2 / (c + ln(d))");
    let inputs = Inputs::new()
        .with("a", 1.5, 0.02)
        .with("b", 0.8, 0.01)
        .with("c", 3.0, 0.3)
        .with("d", 2.2, 0.05);

    let ascending = propagate_with(&expr, &inputs, &PropagationOptions::default()).unwrap();
    let descending = propagate_with(
        &expr,
        &inputs,
        &PropagationOptions::default().with_order(SymbolOrder::ByNameDescending),
    )
    .unwrap();

    assert!((ascending.value - descending.value).abs() < 1e-12);
    assert!((ascending.uncertainty - descending.uncertainty).abs() < 1e-12);
}

#[test]
fn test_report_follows_processing_order() {
    let inputs = Inputs::new().with("y", 2.0, 0.1).with("x", 10.0, 0.5);
    let options = PropagationOptions::default().with_order(SymbolOrder::ByNameDescending);
    let report = propagate_report(&parse("x / y"), &inputs, &options).unwrap();

    let order: Vec<&str> = report.contributions.iter().map(|c| c.symbol.name()).collect();
    assert_eq!(order, ["y", "x"]);
}

#[test]
fn test_missing_variable_fails() {
    let inputs = Inputs::new().with("x", 1.0, 0.1);
    let result = propagate(&parse("x * y"), &inputs);
    assert_eq!(result, Err(PropagationError::MissingVariable(Symbol::new("y"))));
}

#[test]
fn test_first_missing_variable_reported_in_order() {
    let inputs = Inputs::new().with("b", 1.0, 0.1);
    let result = propagate(&parse("c + b + a"), &inputs);
    assert_eq!(result, Err(PropagationError::MissingVariable(Symbol::new("a"))));
}

#[test]
fn test_extra_variables_ignored_by_default() {
    let inputs = Inputs::new().with("x", 2.0, 0.1).with("unused", 5.0, 1.0);
    let report = propagate_report(&parse("3 * x"), &inputs, &PropagationOptions::default()).unwrap();

    assert!((report.result.uncertainty - 0.3).abs() < 1e-12);
    let unused = report.contribution(&Symbol::new("unused")).unwrap();
    assert_eq!(unused.derivative, Expr::num(0.0));
    assert_eq!(unused.weighted, 0.0);
}

#[test]
fn test_extra_variables_rejected_when_strict() {
    let inputs = Inputs::new().with("x", 2.0, 0.1).with("unused", 5.0, 1.0);
    let result = propagate_with(&parse("3 * x"), &inputs, &PropagationOptions::strict());
    assert_eq!(result, Err(PropagationError::UnusedVariable(Symbol::new("unused"))));
}

#[test]
fn test_negative_uncertainty_rejected() {
    let inputs = Inputs::new().with("x", 2.0, -0.1);
    let result = propagate(&parse("x"), &inputs);
    assert!(matches!(
        result,
        Err(PropagationError::InvalidInput { ref symbol, .. }) if symbol.name() == "x"
    ));
}

#[test]
fn test_negative_uncertainty_tolerated_without_validation() {
    let inputs = Inputs::new().with("x", 2.0, -0.1);
    let options = PropagationOptions {
        validate_inputs: false,
        ..PropagationOptions::default()
    };
    let result = propagate_with(&parse("2 * x"), &inputs, &options).unwrap();
    assert!((result.uncertainty - 0.2).abs() < 1e-12);
}

#[test]
fn test_non_finite_value_rejected() {
    let inputs = Inputs::new().with("x", f64::NAN, 0.1);
    assert!(matches!(
        propagate(&parse("x"), &inputs),
        Err(PropagationError::InvalidInput { .. })
    ));
}

#[test]
fn test_singular_partial_is_domain_error() {
    let inputs = Inputs::new().with("x", 0.0, 0.1);
    let result = propagate(&parse("sqrt(x)"), &inputs);
    assert!(matches!(
        result,
        Err(PropagationError::DomainError { ref symbol, .. }) if symbol.name() == "x"
    ));
}

#[test]
fn test_undefined_value_is_non_numeric() {
    // Partial w.r.t. x has no error to evaluate; the value itself is ln(-1)
    let inputs = Inputs::new().with("x", -1.0, 0.0);
    let result = propagate(&parse("ln(x)"), &inputs);
    assert!(matches!(result, Err(PropagationError::NonNumericResult(_))));
}

#[test]
fn test_constant_expression() {
    let result = propagate(&parse("2 * pi"), &Inputs::new()).unwrap();
    assert!((result.value - std::f64::consts::TAU).abs() < 1e-12);
    assert_eq!(result.uncertainty, 0.0);
}

#[test]
fn test_report_dominant_contribution() {
    let inputs = Inputs::new().with("x", 3.0, 0.1).with("y", 2.0, 0.2);
    let report = explain("x**2 + y", &inputs).unwrap();

    let dominant = report.dominant().unwrap();
    assert_eq!(dominant.symbol.name(), "x");
    assert_eq!(dominant.derivative.to_string(), "2 * x");
    assert!((dominant.partial.unwrap() - 6.0).abs() < 1e-12);

    let total: f64 = report.contributions.iter().map(|c| c.variance()).sum();
    assert!((total.sqrt() - report.result.uncertainty).abs() < 1e-12);
}

#[test]
fn test_propagate_str_parse_error() {
    let result = propagate_str("x +", &Inputs::new().with("x", 1.0, 0.1));
    assert!(matches!(result, Err(PropagationError::Parse(_))));
}

#[test]
fn test_inputs_from_json() {
    let inputs = Inputs::from_json(
        r#"{"y": {"value": 2.0, "uncertainty": 0.1}, "x": {"value": 10.0, "uncertainty": 0.5}}"#,
    )
    .unwrap();

    let names: Vec<&str> = inputs.symbols().map(Symbol::name).collect();
    assert_eq!(names, ["x", "y"]);

    let result = propagate_str("x / y", &inputs).unwrap();
    assert!((result.value - 5.0).abs() < 1e-12);
}

#[test]
fn test_options_from_json_use_defaults() {
    let options: PropagationOptions =
        serde_json::from_str(r#"{"extra_symbols": "reject"}"#).unwrap();
    assert_eq!(options.extra_symbols, ExtraSymbols::Reject);
    assert!(options.validate_inputs);
    assert_eq!(options.order, SymbolOrder::ByName);
}

#[test]
fn test_measurement_display() {
    let m = Measurement::new(11.0, 0.632455532);
    assert_eq!(format!("{:.3}", m), "11.000 ± 0.632");
    assert_eq!(m.into_pair(), (11.0, 0.632455532));
    assert_eq!(Measurement::exact(0.0).relative_uncertainty(), None);
}
