//! Expression parser.
//!
//! Supports:
//! - Numbers (integers, floats, scientific notation)
//! - Variables (bare identifiers: `x`, `theta_0`)
//! - Arithmetic operators (+, -, *, /) and powers (`^` or `**`)
//! - Parentheses for grouping
//! - Built-in functions (sin, cos, tan, asin, acos, atan, sinh, cosh, tanh,
//!   sqrt, exp, ln/log, log10, abs)
//! - Built-in constants (`pi`/`PI`, `E`)

use super::{BinaryOperator, Constant, Expr, Function};
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Parse error with location info
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eof,
}

/// Tokenizer
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let pos = self.position;

        let Some(&c) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                self.advance();
                // `**` is an alias for `^`
                if self.chars.peek() == Some(&'*') {
                    self.advance();
                    return Ok(Token::Caret);
                }
                return Ok(Token::Star);
            }
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => return self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => {
                return Ok(Token::Identifier(self.read_identifier()));
            }
            _ => {
                return Err(ParseError::new(
                    format!("Unexpected character: '{}'", c),
                    pos,
                ))
            }
        };
        self.advance();
        Ok(token)
    }

    fn advance(&mut self) -> Option<char> {
        self.position += 1;
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let pos = self.position;
        let mut num_str = String::new();

        self.read_digits(&mut num_str);
        if self.chars.peek() == Some(&'.') {
            num_str.push('.');
            self.advance();
            self.read_digits(&mut num_str);
        }

        // Scientific notation (e.g., 1e10, 1.5e-3)
        if let Some(&c) = self.chars.peek() {
            if c == 'e' || c == 'E' {
                num_str.push(c);
                self.advance();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '+' || sign == '-' {
                        num_str.push(sign);
                        self.advance();
                    }
                }
                self.read_digits(&mut num_str);
            }
        }

        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::new(format!("Invalid number: '{}'", num_str), pos))
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }
}

/// Recursive-descent parser
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect_rparen(&mut self, message: &str) -> Result<(), ParseError> {
        if self.current != Token::RParen {
            return Err(ParseError::new(message, self.lexer.position));
        }
        self.advance()
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", self.current),
                self.lexer.position,
            ));
        }
        Ok(expr)
    }

    // Additive: multiplicative (('+' | '-') multiplicative)*
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    // Multiplicative: unary (('*' | '/') unary)*
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    // Unary: ('-' | '+') unary | power
    // Binds looser than '^' so that -x^2 is -(x^2).
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current {
            Token::Minus => {
                self.advance()?;
                Ok(-self.parse_unary()?)
            }
            Token::Plus => {
                self.advance()?;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // Power: primary ('^' unary)?  (right associative)
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;

        if self.current == Token::Caret {
            self.advance()?;
            let exp = self.parse_unary()?;
            Ok(base.pow(exp))
        } else {
            Ok(base)
        }
    }

    // Primary: number | constant | variable | function '(' expr ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current {
            Token::Number(n) => {
                let val = *n;
                self.advance()?;
                Ok(Expr::Number(val))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                let pos = self.lexer.position;
                self.advance()?;

                if self.current == Token::LParen {
                    let func = Function::from_name(&name).ok_or_else(|| {
                        ParseError::new(format!("Unknown function: '{}'", name), pos)
                    })?;
                    self.advance()?;
                    let arg = self.parse_additive()?;
                    self.expect_rparen("Expected ')' after function argument")?;
                    return Ok(Expr::call(func, arg));
                }

                match name.as_str() {
                    "pi" | "PI" => Ok(Expr::Constant(Constant::Pi)),
                    "E" => Ok(Expr::Constant(Constant::E)),
                    _ => Ok(Expr::var(name)),
                }
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_additive()?;
                self.expect_rparen("Expected ')'")?;
                Ok(expr)
            }
            _ => Err(ParseError::new(
                format!("Unexpected token: {:?}", self.current),
                self.lexer.position,
            )),
        }
    }
}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new("Empty expression", 0));
    }
    let mut parser = Parser::new(input)?;
    parser.parse()
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn test_parse_simple_number() {
        let expr = parse_expression("42").unwrap();
        assert_eq!(expr, Expr::Number(42.0));
    }

    #[test]
    fn test_parse_scientific_notation() {
        let expr = parse_expression("1.5e-3").unwrap();
        if let Expr::Number(n) = expr {
            assert!((n - 0.0015).abs() < 1e-10);
        } else {
            panic!("Expected number");
        }
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression("thickness").unwrap();
        assert_eq!(expr, Expr::var("thickness"));
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * x should parse as 1 + (2 * x)
        let expr = parse_expression("1 + 2 * x").unwrap();
        let expected = Expr::num(1.0) + Expr::num(2.0) * Expr::var("x");
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_parentheses() {
        let expr = parse_expression("(1 + x) * 3").unwrap();
        let expected = (Expr::num(1.0) + Expr::var("x")) * Expr::num(3.0);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_double_star_is_power() {
        assert_eq!(
            parse_expression("x**2").unwrap(),
            parse_expression("x ^ 2").unwrap()
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expression("a ^ b ^ c").unwrap();
        let expected = Expr::var("a").pow(Expr::var("b").pow(Expr::var("c")));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let expr = parse_expression("-x ** 2").unwrap();
        assert_eq!(expr, -Expr::var("x").pow(Expr::num(2.0)));
    }

    #[test]
    fn test_negative_exponent() {
        let expr = parse_expression("x ^ -1").unwrap();
        assert_eq!(expr, Expr::var("x").pow(-Expr::num(1.0)));
    }

    #[test]
    fn test_parse_function() {
        let expr = parse_expression("sqrt(16)").unwrap();
        assert_eq!(expr, Expr::call(Function::Sqrt, Expr::num(16.0)));
    }

    #[test]
    fn test_log_is_natural_log() {
        assert_eq!(
            parse_expression("log(x)").unwrap(),
            Expr::call(Function::Ln, Expr::var("x"))
        );
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(parse_expression("pi").unwrap(), Expr::Constant(Constant::Pi));
        assert_eq!(parse_expression("E").unwrap(), Expr::Constant(Constant::E));
        // Lowercase e stays an ordinary variable
        assert_eq!(parse_expression("e").unwrap(), Expr::var("e"));
    }

    #[test]
    fn test_parse_empty_error() {
        assert!(parse_expression("   ").is_err());
    }

    #[test]
    fn test_parse_invalid_token_error() {
        let err = parse_expression("1 $ 2").unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_parse_missing_paren_error() {
        assert!(parse_expression("(1 + x").is_err());
    }

    #[test]
    fn test_unknown_function_error() {
        let err = parse_expression("mystery(5)").unwrap_err();
        assert!(err.message.contains("mystery"));
    }

    #[test]
    fn test_trailing_tokens_error() {
        assert!(parse_expression("x y").is_err());
    }
}
