//! Scientific keypad actions.

use std::f64::consts::PI;

use voxcalc_types::{DomainError, EvalError, EvaluationResult, format_number};

/// A button on the scientific keypad that acts on the whole buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScientificAction {
    /// Inline percent rewrite; never records history.
    Percent,
    Square,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    /// Natural logarithm.
    Ln,
    /// Base-10 logarithm.
    Log,
    Exp,
    /// Appends a `^` operator.
    Power,
    /// Appends the digits of pi.
    Pi,
}

const ACTION_NAMES: &[(&str, ScientificAction)] = &[
    ("%", ScientificAction::Percent),
    ("percent", ScientificAction::Percent),
    ("square", ScientificAction::Square),
    ("sqr", ScientificAction::Square),
    ("sqrt", ScientificAction::Sqrt),
    ("sin", ScientificAction::Sin),
    ("cos", ScientificAction::Cos),
    ("tan", ScientificAction::Tan),
    ("asin", ScientificAction::Asin),
    ("acos", ScientificAction::Acos),
    ("atan", ScientificAction::Atan),
    ("ln", ScientificAction::Ln),
    ("log", ScientificAction::Log),
    ("exp", ScientificAction::Exp),
    ("^", ScientificAction::Power),
    ("pow", ScientificAction::Power),
    ("pi", ScientificAction::Pi),
    ("π", ScientificAction::Pi),
];

impl ScientificAction {
    /// Look up an action by its button label (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_lowercase();
        ACTION_NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, action)| *action)
    }

    #[must_use]
    pub fn names() -> impl Iterator<Item = &'static str> {
        ACTION_NAMES.iter().map(|(name, _)| *name)
    }

    /// Function name used in history labels, `None` for actions that only
    /// edit the buffer.
    #[must_use]
    pub fn function_name(self) -> Option<&'static str> {
        Some(match self {
            ScientificAction::Square => "sqr",
            ScientificAction::Sqrt => "sqrt",
            ScientificAction::Sin => "sin",
            ScientificAction::Cos => "cos",
            ScientificAction::Tan => "tan",
            ScientificAction::Asin => "asin",
            ScientificAction::Acos => "acos",
            ScientificAction::Atan => "atan",
            ScientificAction::Ln => "ln",
            ScientificAction::Log => "log",
            ScientificAction::Exp => "exp",
            ScientificAction::Percent | ScientificAction::Power | ScientificAction::Pi => {
                return None;
            }
        })
    }

    /// Text appended to the buffer by the operator-style actions.
    #[must_use]
    pub fn append_text(self) -> Option<String> {
        match self {
            ScientificAction::Power => Some("^".to_string()),
            ScientificAction::Pi => Some(format_number(PI)),
            _ => None,
        }
    }

    /// History label such as `sin(3)`.
    #[must_use]
    pub fn label(self, operand: f64) -> Option<String> {
        self.function_name()
            .map(|name| format!("{name}({})", format_number(operand)))
    }

    /// Apply a function action with its domain guard.
    ///
    /// Buffer-editing actions return the operand unchanged; callers dispatch
    /// on [`ScientificAction::function_name`] before getting here.
    pub fn apply(self, x: f64) -> EvaluationResult {
        let value = match self {
            ScientificAction::Square => x * x,
            ScientificAction::Sqrt => {
                if x < 0.0 {
                    return Err(DomainError::NegativeSqrt(x).into());
                }
                x.sqrt()
            }
            ScientificAction::Sin => x.sin(),
            ScientificAction::Cos => x.cos(),
            ScientificAction::Tan => x.tan(),
            ScientificAction::Asin => inverse_trig("asin", x)?.asin(),
            ScientificAction::Acos => inverse_trig("acos", x)?.acos(),
            ScientificAction::Atan => x.atan(),
            ScientificAction::Ln => positive_log("ln", x)?.ln(),
            ScientificAction::Log => positive_log("log", x)?.log10(),
            ScientificAction::Exp => x.exp(),
            ScientificAction::Percent | ScientificAction::Power | ScientificAction::Pi => x,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::Domain(DomainError::NonFinite))
        }
    }
}

fn inverse_trig(function: &'static str, input: f64) -> Result<f64, DomainError> {
    if input.abs() > 1.0 {
        Err(DomainError::InverseTrigRange { function, input })
    } else {
        Ok(input)
    }
}

fn positive_log(function: &'static str, input: f64) -> Result<f64, DomainError> {
    if input <= 0.0 {
        Err(DomainError::NonPositiveLog { function, input })
    } else {
        Ok(input)
    }
}
