//! Expression evaluator.
//!
//! Input goes through three textual rewrites (power caret, percent-of,
//! trailing percent) and is then parsed by a small recursive-descent parser
//! over this grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := number | '(' expr ')' | 'sqrt' unary
//! ```
//!
//! `**` is right associative and binds tighter than unary minus on its left,
//! so `-2**2` is `-4` and `2**-1` is `0.5`. A `%` left after the rewrites is
//! the remainder operator.

use std::sync::OnceLock;

use regex::Regex;
use voxcalc_types::{DomainError, EvalError, EvaluationResult, ParseError, format_number};

const MAX_DEPTH: usize = 128;

struct Patterns {
    percent_of: Regex,
    percent: Regex,
    square: Regex,
    sqrt: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        percent_of: Regex::new(r"(\d+(?:\.\d+)?)%\s*(?:of\s*)?(\d+(?:\.\d+)?)")
            .expect("valid percent-of regex"),
        percent: Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid percent regex"),
        square: Regex::new(r"^(\d+(?:\.\d+)?)\^2$").expect("valid square shortcut regex"),
        sqrt: Regex::new(r"^sqrt(-?\d+(?:\.\d+)?)$").expect("valid sqrt shortcut regex"),
    })
}

/// Shapes evaluated without the general parser.
///
/// Both agree with the general path: `N^2` is `N*N` and `sqrtN` is the
/// non-negative root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FastPath {
    Square(f64),
    Sqrt(f64),
}

impl FastPath {
    /// Match a trimmed expression against the shortcut shapes.
    #[must_use]
    pub fn detect(expr: &str) -> Option<Self> {
        let patterns = patterns();
        let expr = expr.trim();
        if let Some(caps) = patterns.square.captures(expr) {
            return caps[1].parse().ok().map(FastPath::Square);
        }
        if let Some(caps) = patterns.sqrt.captures(expr) {
            return caps[1].parse().ok().map(FastPath::Sqrt);
        }
        None
    }

    pub fn evaluate(self) -> EvaluationResult {
        match self {
            FastPath::Square(n) => finite(n * n),
            FastPath::Sqrt(n) => sqrt(n).map_err(EvalError::from),
        }
    }

    /// History label. Square roots are recorded as `sqrt(N)`.
    #[must_use]
    pub fn label(self, expr: &str) -> String {
        match self {
            FastPath::Square(_) => expr.trim().to_string(),
            FastPath::Sqrt(n) => format!("sqrt({})", format_number(n)),
        }
    }
}

fn sqrt(n: f64) -> Result<f64, DomainError> {
    if n < 0.0 {
        Err(DomainError::NegativeSqrt(n))
    } else {
        Ok(n.sqrt())
    }
}

fn finite(value: f64) -> EvaluationResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite.into())
    }
}

/// Apply the caret and percent rewrites, in that order.
#[must_use]
pub fn prepare_expression(expr: &str) -> String {
    let patterns = patterns();
    let powered = expr.replace('^', "**");
    let percent_of = patterns
        .percent_of
        .replace_all(&powered, "(${2}*(${1}/100))");
    patterns
        .percent
        .replace_all(&percent_of, "(${1}/100)")
        .into_owned()
}

/// Evaluate an arithmetic string.
///
/// Non-finite results (division by zero, overflow) are reported as
/// [`DomainError::NonFinite`].
pub fn evaluate(expr: &str) -> EvaluationResult {
    let trimmed = expr.trim();
    if let Some(fast) = FastPath::detect(trimmed) {
        tracing::debug!(expr = trimmed, ?fast, "fast path");
        return fast.evaluate();
    }

    let prepared = prepare_expression(trimmed);
    let tokens = tokenize(&prepared)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.parse()?;
    finite(value)
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    LParen,
    RParen,
    Sqrt,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Token::Number(n) => format_number(n),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Percent => "%".to_string(),
            Token::Pow => "**".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Sqrt => "sqrt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spanned {
    token: Token,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let offset = i;
        let token = match b {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &input[start..i];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber(literal.to_string()))?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    offset,
                });
                continue;
            }
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 1;
                Token::Pow
            }
            b'^' => Token::Pow,
            b'*' => Token::Star,
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b's' if input[i..].starts_with("sqrt") => {
                i += 3;
                Token::Sqrt
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(ParseError::InvalidToken { ch, offset });
            }
        };
        i += 1;
        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn parse(&mut self) -> EvaluationResult {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty.into());
        }
        let value = self.expr()?;
        match self.tokens.get(self.pos) {
            None => Ok(value),
            Some(Spanned {
                token: Token::RParen,
                ..
            }) => Err(ParseError::UnbalancedParens.into()),
            Some(spanned) => Err(unexpected(*spanned)),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    fn next(&mut self) -> Result<Spanned, ParseError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(ParseError::TooDeep)
        } else {
            Ok(())
        }
    }

    fn expr(&mut self) -> EvaluationResult {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> EvaluationResult {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                Token::Slash => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> EvaluationResult {
        self.enter()?;
        let result = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        };
        self.depth -= 1;
        result
    }

    fn power(&mut self) -> EvaluationResult {
        let base = self.primary()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> EvaluationResult {
        let spanned = self.next()?;
        match spanned.token {
            Token::Number(n) => Ok(n),
            Token::LParen => {
                self.enter()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Ok(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(value),
                    Ok(other) => Err(unexpected(other)),
                    Err(_) => Err(ParseError::UnbalancedParens.into()),
                }
            }
            Token::Sqrt => {
                let operand = self.unary()?;
                Ok(sqrt(operand)?)
            }
            Token::RParen => Err(ParseError::UnbalancedParens.into()),
            _ => Err(unexpected(spanned)),
        }
    }
}

fn unexpected(spanned: Spanned) -> EvalError {
    ParseError::UnexpectedToken {
        token: spanned.token.describe(),
        offset: spanned.offset,
    }
    .into()
}
