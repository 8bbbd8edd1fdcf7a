//! Core domain types for voxcalc.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod eval;
mod number;
mod text;
mod view;

pub use eval::{DomainError, ErrorKind, EvalError, EvaluationResult, ParseError};
pub use number::{
    ERROR_MARKER, THINKING_MARKER, format_bounded, format_number, parse_display_number,
};
pub use text::{truncate_chars, truncate_with_ellipsis};
pub use view::{Announcement, HistorySelection, SettingChange, ShellState, Theme, View};

use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials
// ============================================================================

/// API key for the remote word-problem solver.
///
/// Never printed through `Debug`; use [`ApiKey::as_str`] at the request boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank keys so "configured but empty" reads as missing.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

// ============================================================================
// History records
// ============================================================================

/// A calculation the core asks the History collaborator to remember.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub expression: String,
    pub result: String,
}

impl HistoryRecord {
    #[must_use]
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
        }
    }
}

/// A stored history entry. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
    pub timestamp: i64,
}

impl HistoryEntry {
    #[must_use]
    pub fn from_record(record: HistoryRecord, timestamp: i64) -> Self {
        Self {
            expression: record.expression,
            result: record.result,
            timestamp,
        }
    }
}

// ============================================================================
// Router output
// ============================================================================

/// A locally computed answer, ready to be applied to the session.
///
/// `label` is what the History collaborator records as the expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Computation {
    pub label: String,
    pub result: EvaluationResult,
}

impl Computation {
    #[must_use]
    pub fn new(label: impl Into<String>, result: EvaluationResult) -> Self {
        Self {
            label: label.into(),
            result,
        }
    }
}

/// What the Command Router decided to do with one utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterAction {
    /// Switch the shell to a view (closing a view navigates to `Standard`).
    Navigate(View),
    ToggleSetting(SettingChange),
    Compute(Computation),
    /// Hand the original raw text to the remote solver.
    DelegateToRemoteSolver(String),
    ClearSession,
    ClearHistory,
    ExportHistory(HistorySelection),
    Inform(Announcement),
    NoOp,
}
