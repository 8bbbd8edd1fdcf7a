//! Lexical normalizer: free-form spoken or typed text to a canonical
//! arithmetic string.
//!
//! The passes run in a fixed order and later passes depend on the output of
//! earlier ones:
//!
//! 1. lowercase
//! 2. number words to digits (compound tens first, then single words)
//! 3. operator phrases to symbols, longest phrase first
//! 4. filler words removed
//! 5. shape rewrites for squares, powers, and square roots
//! 6. whitespace collapsed, and dropped around operators and parentheses
//!
//! Normalization never fails. Text that is not arithmetic survives as-is
//! and is rejected later by the evaluator. Spaces between two operands are
//! kept, so "12 34" stays two numbers instead of becoming 1234.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

const SMALL_NUMBERS: [(&str, u32); 20] = [
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: [(&str, u32); 8] = [
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Operator phrases and their symbols. Applied longest first, so
/// "multiplied by" wins over "multiply" and "percent of" over "percent".
const OPERATOR_PHRASES: [(&str, &str); 17] = [
    ("plus", "+"),
    ("minus", "-"),
    ("times", "*"),
    ("into", "*"),
    ("multiply by", "*"),
    ("multiplied by", "*"),
    ("multiply", "*"),
    ("divided by", "/"),
    ("divide", "/"),
    ("percent of", "%"),
    ("percentages", "%"),
    ("percent", "%"),
    ("square root", "sqrt "),
    ("root", "sqrt "),
    ("to the power of", "^"),
    ("power", "^"),
    ("x", "*"),
];

/// Removed after operator substitution. "equals to" precedes "equals".
const FILLER_WORDS: [&str; 7] = [
    "calculate",
    "what is",
    "equals to",
    "equals",
    "answer",
    "please",
    "by",
];

/// An arithmetic string produced by [`normalize`].
///
/// Only the normalizer constructs these. The evaluator accepts any `&str`
/// because keypad input reaches it without passing through here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalExpression(String);

impl CanonicalExpression {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalExpression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

struct Rules {
    compound_tens: Regex,
    small_numbers: Regex,
    tens: Regex,
    operators: Vec<(Regex, &'static str)>,
    fillers: Vec<Regex>,
    square_prefix: Regex,
    square_suffix: Regex,
    power: Regex,
    square_root: Regex,
    whitespace: Regex,
    operator_spacing: Regex,
}

fn word_alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.map(regex::escape).collect::<Vec<_>>().join("|")
}

fn bounded(phrase: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(phrase))).expect("valid bounded phrase regex")
}

impl Rules {
    fn new() -> Self {
        let tens_alt = word_alternation(TENS.iter().map(|(w, _)| *w));
        let ones_alt = word_alternation(SMALL_NUMBERS[1..10].iter().map(|(w, _)| *w));
        let small_alt = word_alternation(SMALL_NUMBERS.iter().map(|(w, _)| *w));

        let mut phrases = OPERATOR_PHRASES.to_vec();
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            compound_tens: Regex::new(&format!(r"\b({tens_alt})\s+({ones_alt})\b"))
                .expect("valid compound tens regex"),
            small_numbers: Regex::new(&format!(r"\b({small_alt})\b"))
                .expect("valid small number regex"),
            tens: Regex::new(&format!(r"\b({tens_alt})\b")).expect("valid tens regex"),
            operators: phrases
                .into_iter()
                .map(|(phrase, symbol)| (bounded(phrase), symbol))
                .collect(),
            fillers: FILLER_WORDS.iter().map(|w| bounded(w)).collect(),
            square_prefix: Regex::new(
                r"\b(?:square|squared|x2|x\s*squared)\b\s*(?:of\s*)?(\d+(?:\.\d+)?)",
            )
            .expect("valid square prefix regex"),
            square_suffix: Regex::new(r"(\d+(?:\.\d+)?)\s*\b(?:square|squared|x2|x\s*squared)\b")
                .expect("valid square suffix regex"),
            power: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:\^|to the power of|power)\s*(\d+(?:\.\d+)?)")
                .expect("valid power regex"),
            square_root: Regex::new(r"(?:square root|root|sqrt)\s*(?:of\s*)?(\d+(?:\.\d+)?)")
                .expect("valid square root regex"),
            whitespace: Regex::new(r"\s+").expect("valid whitespace regex"),
            operator_spacing: Regex::new(r"\s*([-+*/%^()])\s*")
                .expect("valid operator spacing regex"),
        }
    }
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(Rules::new)
}

fn lookup(table: &[(&str, u32)], word: &str) -> u32 {
    table
        .iter()
        .find(|(w, _)| *w == word)
        .map_or(0, |(_, value)| *value)
}

/// Replace English number words (zero through ninety-nine) with digits.
///
/// Input is lowercased first. "twenty five" becomes "25" rather than "20 5"
/// because the compound pattern runs before the single-word passes.
#[must_use]
pub fn words_to_digits(text: &str) -> String {
    let rules = rules();
    let lower = text.to_lowercase();

    let compound = rules.compound_tens.replace_all(&lower, |caps: &Captures| {
        (lookup(&TENS, &caps[1]) + lookup(&SMALL_NUMBERS, &caps[2])).to_string()
    });
    let small = rules.small_numbers.replace_all(&compound, |caps: &Captures| {
        lookup(&SMALL_NUMBERS, &caps[1]).to_string()
    });
    rules
        .tens
        .replace_all(&small, |caps: &Captures| lookup(&TENS, &caps[1]).to_string())
        .into_owned()
}

fn substitute_operators(text: &str) -> String {
    rules()
        .operators
        .iter()
        .fold(text.to_string(), |acc, (pattern, symbol)| {
            pattern.replace_all(&acc, *symbol).into_owned()
        })
}

fn strip_fillers(text: &str) -> String {
    rules()
        .fillers
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        })
}

fn rewrite_shapes(text: &str) -> String {
    let rules = rules();
    let text = rules.square_prefix.replace_all(text, "${1}**2");
    let text = rules.square_suffix.replace_all(&text, "${1}**2");
    let text = rules.power.replace_all(&text, "${1}^${2}");
    rules
        .square_root
        .replace_all(&text, "sqrt${1}")
        .into_owned()
}

fn compact_whitespace(text: &str) -> String {
    let rules = rules();
    let collapsed = rules.whitespace.replace_all(text.trim(), " ");
    rules
        .operator_spacing
        .replace_all(&collapsed, "${1}")
        .into_owned()
}

/// Normalize raw input into a [`CanonicalExpression`].
///
/// Idempotent on strings that are already canonical.
#[must_use]
pub fn normalize(input: &str) -> CanonicalExpression {
    let digits = words_to_digits(input);
    let operators = substitute_operators(&digits);
    let trimmed = strip_fillers(&operators);
    let shaped = rewrite_shapes(&trimmed);
    let compact = compact_whitespace(&shaped);

    tracing::debug!(input, canonical = %compact, "normalized utterance");
    CanonicalExpression(compact)
}
