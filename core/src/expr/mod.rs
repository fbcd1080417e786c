//! Symbolic expressions over named variables.
//!
//! Provides:
//! - An immutable expression tree (`Expr`) with arithmetic, powers and
//!   elementary functions
//! - A text parser (`x**2 + y`, `sin(theta) / r`)
//! - Exact partial differentiation
//! - Numeric evaluation against variable bindings

pub mod parser;
pub mod diff;
pub mod eval;

pub use parser::{parse_expression, ParseError};
pub use eval::{Bindings, EvalError};

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Built-in constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(&self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

/// Single-argument elementary functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Abs,
}

impl Function {
    /// Look up a function by the name used in expression text
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "abs" => Self::Abs,
            _ => return None,
        };
        Some(func)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Abs => "abs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOperator {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 4,
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Built-in constant (pi, E)
    Constant(Constant),
    /// Free variable
    Variable(Symbol),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Negation
    Neg(Box<Expr>),
    /// Function application
    Call { func: Function, arg: Box<Expr> },
}

const NEG_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

impl Expr {
    pub fn num(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn var(name: impl Into<Symbol>) -> Self {
        Self::Variable(name.into())
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Self::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pow(self, exponent: Expr) -> Self {
        Self::binary(BinaryOperator::Pow, self, exponent)
    }

    pub fn call(func: Function, arg: Expr) -> Self {
        Self::Call {
            func,
            arg: Box::new(arg),
        }
    }

    /// Numeric value if this node is a literal
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// All variables referenced by the expression, sorted by name
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Self::Number(_) | Self::Constant(_) => {}
            Self::Variable(s) => {
                out.insert(s.clone());
            }
            Self::BinaryOp { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
            Self::Neg(inner) | Self::Call { arg: inner, .. } => inner.collect_symbols(out),
        }
    }

    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match self {
            Self::Number(_) | Self::Constant(_) => false,
            Self::Variable(s) => s == symbol,
            Self::BinaryOp { left, right, .. } => {
                left.contains_symbol(symbol) || right.contains_symbol(symbol)
            }
            Self::Neg(inner) | Self::Call { arg: inner, .. } => inner.contains_symbol(symbol),
        }
    }

    /// Replace bound variables with numeric literals.
    ///
    /// Unbound variables are left in place, so the result may still be symbolic.
    pub fn substitute(&self, bindings: &Bindings) -> Expr {
        match self {
            Self::Number(_) | Self::Constant(_) => self.clone(),
            Self::Variable(s) => match bindings.get(s) {
                Some(value) => Self::Number(value),
                None => self.clone(),
            },
            Self::BinaryOp { op, left, right } => {
                Self::binary(*op, left.substitute(bindings), right.substitute(bindings))
            }
            Self::Neg(inner) => Self::Neg(Box::new(inner.substitute(bindings))),
            Self::Call { func, arg } => Self::call(*func, arg.substitute(bindings)),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Number(n) if *n < 0.0 => NEG_PRECEDENCE,
            Self::BinaryOp { op, .. } => op.precedence(),
            Self::Neg(_) => NEG_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Constant(Constant::Pi) => write!(f, "pi"),
            Self::Constant(Constant::E) => write!(f, "E"),
            Self::Variable(s) => write!(f, "{}", s),
            Self::BinaryOp { op, left, right } => {
                let p = op.precedence();
                // Sub, Div are left associative and Pow is right associative,
                // so the non-associative side needs a strictly higher precedence.
                let (lp, rp) = match op {
                    BinaryOperator::Add | BinaryOperator::Mul => (p, p),
                    BinaryOperator::Sub | BinaryOperator::Div => (p, p + 1),
                    BinaryOperator::Pow => (p + 1, p),
                };
                left.fmt_operand(f, lp)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, rp)
            }
            Self::Neg(inner) => {
                write!(f, "-")?;
                inner.fmt_operand(f, NEG_PRECEDENCE + 1)
            }
            Self::Call { func, arg } => write!(f, "{}({})", func.name(), arg),
        }
    }
}

impl std::str::FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expression(s)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::Variable(symbol)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl std::ops::$trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, Expr::Number(rhs))
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOperator::Add);
impl_binary_operator!(Sub, sub, BinaryOperator::Sub);
impl_binary_operator!(Mul, mul, BinaryOperator::Mul);
impl_binary_operator!(Div, div, BinaryOperator::Div);

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

/// Capability the propagator needs from an expression type.
///
/// `Expr` implements it; other computer-algebra backends can plug in by
/// implementing the same three operations.
pub trait Expression: Sized {
    /// Exact partial derivative with respect to `symbol`
    fn differentiate(&self, symbol: &Symbol) -> Self;

    /// Numeric value with every variable taken from `bindings`
    fn evaluate(&self, bindings: &Bindings) -> Result<f64, EvalError>;

    /// Variables the expression depends on
    fn free_symbols(&self) -> BTreeSet<Symbol>;
}

impl Expression for Expr {
    fn differentiate(&self, symbol: &Symbol) -> Self {
        diff::differentiate(self, symbol)
    }

    fn evaluate(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        eval::evaluate(self, bindings)
    }

    fn free_symbols(&self) -> BTreeSet<Symbol> {
        Expr::free_symbols(self)
    }
}
