//! Exact symbolic differentiation.
//!
//! Results are built through folding constructors that drop additive zeros,
//! multiplicative ones and literal-only subtrees, so `d/dx (3 * x)` is `3`
//! rather than `0 * x + 3 * 1`. No further simplification is attempted.

use super::{BinaryOperator, Constant, Expr, Function};
use crate::symbol::Symbol;

fn fold(value: f64, fallback: impl FnOnce() -> Expr) -> Expr {
    // Never fold into NaN/inf; leave those for the evaluator to report.
    if value.is_finite() {
        Expr::Number(value)
    } else {
        fallback()
    }
}

fn add(a: Expr, b: Expr) -> Expr {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => fold(x + y, || a + b),
        (Some(x), _) if x == 0.0 => b,
        (_, Some(y)) if y == 0.0 => a,
        _ => a + b,
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => fold(x - y, || a - b),
        (Some(x), _) if x == 0.0 => neg(b),
        (_, Some(y)) if y == 0.0 => a,
        _ => a - b,
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => fold(x * y, || a * b),
        (Some(x), _) | (_, Some(x)) if x == 0.0 => Expr::Number(0.0),
        (Some(x), _) if x == 1.0 => b,
        (_, Some(y)) if y == 1.0 => a,
        (Some(x), _) if x == -1.0 => neg(b),
        (_, Some(y)) if y == -1.0 => neg(a),
        _ => a * b,
    }
}

fn div(a: Expr, b: Expr) -> Expr {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) if y != 0.0 => fold(x / y, || a / b),
        (Some(x), _) if x == 0.0 => Expr::Number(0.0),
        (_, Some(y)) if y == 1.0 => a,
        _ => a / b,
    }
}

fn pow(base: Expr, exponent: Expr) -> Expr {
    match exponent.as_number() {
        Some(n) if n == 0.0 => Expr::Number(1.0),
        Some(n) if n == 1.0 => base,
        _ => base.pow(exponent),
    }
}

fn neg(a: Expr) -> Expr {
    match a {
        Expr::Number(n) => Expr::Number(-n),
        Expr::Neg(inner) => *inner,
        other => -other,
    }
}

fn call(func: Function, arg: Expr) -> Expr {
    Expr::call(func, arg)
}

/// Derivative of `func` evaluated at `u`, without the chain-rule factor
fn function_derivative(func: Function, u: &Expr) -> Expr {
    let u = u.clone();
    let one = || Expr::Number(1.0);
    let two = || Expr::Number(2.0);
    match func {
        Function::Sin => call(Function::Cos, u),
        Function::Cos => neg(call(Function::Sin, u)),
        Function::Tan => div(one(), pow(call(Function::Cos, u), two())),
        Function::Asin => div(one(), call(Function::Sqrt, sub(one(), pow(u, two())))),
        Function::Acos => neg(div(one(), call(Function::Sqrt, sub(one(), pow(u, two()))))),
        Function::Atan => div(one(), add(one(), pow(u, two()))),
        Function::Sinh => call(Function::Cosh, u),
        Function::Cosh => call(Function::Sinh, u),
        Function::Tanh => sub(one(), pow(call(Function::Tanh, u), two())),
        Function::Sqrt => div(one(), mul(two(), call(Function::Sqrt, u))),
        Function::Exp => call(Function::Exp, u),
        Function::Ln => div(one(), u),
        Function::Log10 => div(one(), mul(u, call(Function::Ln, Expr::Number(10.0)))),
        // Undefined at zero: u / |u| divides by zero there.
        Function::Abs => div(u.clone(), call(Function::Abs, u)),
    }
}

/// Partial derivative of `expr` with respect to `symbol`
pub fn differentiate(expr: &Expr, symbol: &Symbol) -> Expr {
    if !expr.contains_symbol(symbol) {
        return Expr::Number(0.0);
    }

    match expr {
        Expr::Number(_) | Expr::Constant(_) => Expr::Number(0.0),
        Expr::Variable(s) => Expr::Number(if s == symbol { 1.0 } else { 0.0 }),
        Expr::Neg(inner) => neg(differentiate(inner, symbol)),
        Expr::Call { func, arg } => mul(
            function_derivative(*func, arg),
            differentiate(arg, symbol),
        ),
        Expr::BinaryOp { op, left, right } => {
            let (l, r) = (left.as_ref(), right.as_ref());
            match op {
                BinaryOperator::Add => add(differentiate(l, symbol), differentiate(r, symbol)),
                BinaryOperator::Sub => sub(differentiate(l, symbol), differentiate(r, symbol)),
                BinaryOperator::Mul => add(
                    mul(differentiate(l, symbol), r.clone()),
                    mul(l.clone(), differentiate(r, symbol)),
                ),
                BinaryOperator::Div => {
                    if !r.contains_symbol(symbol) {
                        return div(differentiate(l, symbol), r.clone());
                    }
                    let numerator = sub(
                        mul(differentiate(l, symbol), r.clone()),
                        mul(l.clone(), differentiate(r, symbol)),
                    );
                    div(numerator, pow(r.clone(), Expr::Number(2.0)))
                }
                BinaryOperator::Pow => differentiate_pow(l, r, symbol),
            }
        }
    }
}

fn differentiate_pow(base: &Expr, exponent: &Expr, symbol: &Symbol) -> Expr {
    let du = differentiate(base, symbol);

    // Power rule: d(u^n) = n * u^(n - 1) * du
    if !exponent.contains_symbol(symbol) {
        let lowered = match exponent.as_number() {
            Some(n) => Expr::Number(n - 1.0),
            None => sub(exponent.clone(), Expr::Number(1.0)),
        };
        return mul(mul(exponent.clone(), pow(base.clone(), lowered)), du);
    }

    let dv = differentiate(exponent, symbol);
    let this = base.clone().pow(exponent.clone());

    // Exponential rule: d(a^v) = a^v * ln(a) * dv
    if !base.contains_symbol(symbol) {
        let ln_base = match base {
            Expr::Constant(Constant::E) => Expr::Number(1.0),
            _ => call(Function::Ln, base.clone()),
        };
        return mul(mul(this, ln_base), dv);
    }

    // General rule: d(u^v) = u^v * (dv * ln(u) + v * du / u)
    let inner = add(
        mul(dv, call(Function::Ln, base.clone())),
        div(mul(exponent.clone(), du), base.clone()),
    );
    mul(this, inner)
}
