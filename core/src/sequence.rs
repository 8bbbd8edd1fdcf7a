//! Next-term inference for "complete the series" queries.

use std::sync::OnceLock;

use regex::Regex;

use crate::normalize::words_to_digits;

const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionKind {
    Geometric,
    Arithmetic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progression {
    pub kind: ProgressionKind,
    pub next: f64,
}

struct Patterns {
    keyword: Regex,
    list: Regex,
    number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        keyword: Regex::new(r"series|sequence|pattern|next|complete")
            .expect("valid series keyword regex"),
        list: Regex::new(r"^\d+(?:[\s,]+\d+){2,}$").expect("valid number list regex"),
        number: Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number literal regex"),
    })
}

/// The series heuristic: a progression keyword anywhere, or a bare list of
/// three or more numbers separated by commas or whitespace.
#[must_use]
pub fn is_series_query(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    let patterns = patterns();
    patterns.keyword.is_match(&lowered) || patterns.list.is_match(&words_to_digits(&lowered))
}

/// Every numeric literal in the utterance, after number words become digits.
#[must_use]
pub fn extract_numbers(raw: &str) -> Vec<f64> {
    let digits = words_to_digits(&raw.to_lowercase());
    patterns()
        .number
        .find_iter(&digits)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Predict the next term. Geometric is checked first, so a constant
/// sequence reports as geometric.
#[must_use]
pub fn infer_next(numbers: &[f64]) -> Option<Progression> {
    let (&first, rest) = numbers.split_first()?;
    let (&second, _) = rest.split_first()?;
    let &last = numbers.last()?;

    let ratio = second / first;
    let geometric = numbers
        .windows(2)
        .all(|pair| (pair[1] / pair[0] - ratio).abs() < TOLERANCE);
    if geometric {
        return finite(ProgressionKind::Geometric, last * ratio);
    }

    let diff = second - first;
    let arithmetic = numbers
        .windows(2)
        .all(|pair| (pair[1] - pair[0] - diff).abs() < TOLERANCE);
    if arithmetic {
        return finite(ProgressionKind::Arithmetic, last + diff);
    }

    None
}

fn finite(kind: ProgressionKind, next: f64) -> Option<Progression> {
    next.is_finite().then_some(Progression { kind, next })
}
