//! Evaluation outcome types.

use thiserror::Error;

/// Outcome of evaluating an arithmetic string.
pub type EvaluationResult = Result<f64, EvalError>;

/// Coarse classification used by callers that only care which bucket failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Domain,
}

/// Why an expression could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character '{ch}' at offset {offset}")]
    InvalidToken { ch: char, offset: usize },
    #[error("malformed number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("expression is nested too deeply")]
    TooDeep,
}

/// An input outside the domain of a guarded function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("square root of negative number {0}")]
    NegativeSqrt(f64),
    #[error("{function} is undefined for {input} (|x| must be <= 1)")]
    InverseTrigRange { function: &'static str, input: f64 },
    #[error("{function} is undefined for {input} (x must be > 0)")]
    NonPositiveLog { function: &'static str, input: f64 },
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl EvalError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Parse(_) => ErrorKind::Parse,
            EvalError::Domain(_) => ErrorKind::Domain,
        }
    }
}
