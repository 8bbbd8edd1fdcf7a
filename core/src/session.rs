//! Calculator session state: the display buffer and the "just calculated" flag.
//!
//! The session never talks to collaborators. Operations that finish a
//! calculation return [`SessionEffects`] describing what should be spoken
//! and what should be recorded, and the caller performs them.

use std::sync::OnceLock;

use regex::Regex;
use voxcalc_types::{
    Computation, ERROR_MARKER, EvaluationResult, HistoryRecord, THINKING_MARKER, format_bounded,
    format_number,
};

use crate::actions::ScientificAction;
use crate::evaluate::{FastPath, evaluate};
use crate::narrate::narrate;

/// Side effects the caller owes after a session operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEffects {
    /// Sentence for the text-to-speech collaborator.
    pub narration: Option<String>,
    /// Entry for the History collaborator.
    pub history: Option<HistoryRecord>,
}

impl SessionEffects {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.narration.is_none() && self.history.is_none()
    }
}

struct Patterns {
    trailing_number: Regex,
    inline_percent: Regex,
    percent_operand: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        trailing_number: Regex::new(r"^(.*?)(\d+\.?\d*)$").expect("valid trailing number regex"),
        inline_percent: Regex::new(r"(\d+(?:\.\d+)?)\s*([+\-*/])\s*(\d+(?:\.\d+)?)$")
            .expect("valid inline percent regex"),
        percent_operand: Regex::new(r"^(.*?)(\d+(?:\.\d+)?)$")
            .expect("valid percent operand regex"),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    buffer: String,
    just_calculated: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn just_calculated(&self) -> bool {
        self.just_calculated
    }

    /// Append a keypad token. A numeric token right after a result starts a
    /// fresh buffer; operators continue from the result.
    pub fn append(&mut self, token: &str) {
        if self.just_calculated && is_numeric(token) {
            self.buffer = token.to_string();
        } else {
            self.buffer.push_str(token);
        }
        self.just_calculated = false;
    }

    /// Drop the trailing number as one unit, or one character if the buffer
    /// does not end in a digit.
    pub fn delete_last(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if let Some(caps) = patterns().trailing_number.captures(&self.buffer) {
            let keep = caps.get(1).map_or(0, |m| m.end());
            self.buffer.truncate(keep);
        } else {
            self.buffer.pop();
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.just_calculated = false;
    }

    /// Evaluate the buffer. An empty buffer is left alone.
    pub fn calculate(&mut self) -> SessionEffects {
        let expr = self.buffer.trim().to_string();
        if expr.is_empty() {
            return SessionEffects::none();
        }
        let label = FastPath::detect(&expr).map_or_else(|| expr.clone(), |fast| fast.label(&expr));
        let result = evaluate(&expr);
        self.apply_computation(Computation::new(label, result))
    }

    /// Show a result computed elsewhere (the router's voice path).
    pub fn apply_computation(&mut self, computation: Computation) -> SessionEffects {
        let Computation { label, result } = computation;
        self.settle(label, result, format_number)
    }

    /// Show the remote solver's answer for `raw`.
    pub fn apply_remote_answer(&mut self, raw: &str, answer: &str) -> SessionEffects {
        self.buffer = answer.to_string();
        self.just_calculated = true;
        SessionEffects {
            narration: Some(narrate(answer)),
            history: Some(HistoryRecord::new(raw, answer)),
        }
    }

    /// Replace the buffer with a status message such as `Set API Key`.
    pub fn show_message(&mut self, message: &str) {
        self.buffer = message.to_string();
        self.just_calculated = false;
    }

    pub fn show_thinking(&mut self) {
        self.show_message(THINKING_MARKER);
    }

    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.buffer == THINKING_MARKER
    }

    /// Apply a scientific keypad action to the buffer.
    pub fn apply_unary_action(&mut self, action: ScientificAction) -> SessionEffects {
        if action == ScientificAction::Percent {
            self.percent_inline();
            return SessionEffects::none();
        }
        if let Some(text) = action.append_text() {
            self.buffer.push_str(&text);
            self.just_calculated = false;
            return SessionEffects::none();
        }

        let source = if self.buffer.trim().is_empty() {
            "0"
        } else {
            self.buffer.trim()
        };
        let operand = match evaluate(source) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, ?action, "unary action operand did not evaluate");
                return self.settle(String::new(), Err(err), format_bounded);
            }
        };
        let label = action.label(operand).unwrap_or_default();
        self.settle(label, action.apply(operand), format_bounded)
    }

    fn settle(
        &mut self,
        label: String,
        result: EvaluationResult,
        format: fn(f64) -> String,
    ) -> SessionEffects {
        match result {
            Ok(value) => {
                let display = format(value);
                self.buffer.clone_from(&display);
                self.just_calculated = true;
                SessionEffects {
                    narration: Some(narrate(&display)),
                    history: Some(HistoryRecord::new(label, display)),
                }
            }
            Err(err) => {
                tracing::debug!(%err, kind = ?err.kind(), "calculation failed");
                self.buffer = ERROR_MARKER.to_string();
                self.just_calculated = false;
                SessionEffects {
                    narration: Some(narrate(ERROR_MARKER)),
                    history: None,
                }
            }
        }
    }

    /// `A+B` / `A-B` becomes `A+(A*B/100)` computed inline; otherwise the
    /// trailing number is divided by 100.
    fn percent_inline(&mut self) {
        let patterns = patterns();
        self.just_calculated = false;

        if let Some(caps) = patterns.inline_percent.captures(&self.buffer)
            && matches!(&caps[2], "+" | "-")
            && let (Ok(a), Ok(b)) = (caps[1].parse::<f64>(), caps[3].parse::<f64>())
        {
            let start = caps.get(0).map_or(0, |m| m.start());
            let rewritten = format!(
                "{}{}{}{}",
                &self.buffer[..start],
                format_number(a),
                &caps[2],
                format_number(a * b / 100.0)
            );
            self.buffer = rewritten;
            return;
        }

        if let Some(caps) = patterns.percent_operand.captures(&self.buffer)
            && let Ok(last) = caps[2].parse::<f64>()
        {
            let rewritten = format!("{}{}", &caps[1], format_number(last / 100.0));
            self.buffer = rewritten;
        }
    }
}

fn is_numeric(token: &str) -> bool {
    let trimmed = token.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}
