//! Command Router: one utterance in, one [`RouterAction`] out.
//!
//! Classification order, first match wins:
//!
//! 1. exact `clear` / `c`
//! 2. shell commands from [`crate::voice`]
//! 3. the `sqrtN` shortcut on the normalized text
//! 4. general evaluation, skipped when the series heuristic matches
//! 5. sequence inference for series queries
//! 6. delegation of the raw text to the remote solver
//!
//! Routing is pure: nothing here touches the session or the shell.

use voxcalc_core::{FastPath, evaluate, extract_numbers, infer_next, is_series_query, normalize};
use voxcalc_types::{Computation, RouterAction, ShellState};

use crate::voice::{Utterance, match_command};

#[must_use]
pub fn route(raw: &str, shell: &ShellState, history_len: usize) -> RouterAction {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if lowered.is_empty() {
        return RouterAction::NoOp;
    }
    if matches!(lowered.as_str(), "clear" | "c") {
        return RouterAction::ClearSession;
    }
    if let Some(action) = match_command(Utterance::new(&lowered), shell, history_len) {
        return action;
    }

    let canonical = normalize(&lowered);
    if let Some(fast @ FastPath::Sqrt(_)) = FastPath::detect(canonical.as_str()) {
        tracing::debug!(expr = %canonical, "square root shortcut");
        return RouterAction::Compute(Computation::new(
            fast.label(canonical.as_str()),
            fast.evaluate(),
        ));
    }

    let series = is_series_query(&lowered);
    if !series {
        match evaluate(canonical.as_str()) {
            Ok(value) => {
                return RouterAction::Compute(Computation::new(canonical.into_inner(), Ok(value)));
            }
            Err(e) => tracing::debug!(expr = %canonical, "local evaluation failed: {e}"),
        }
    }

    if series && let Some(progression) = infer_next(&extract_numbers(&lowered)) {
        tracing::debug!(kind = ?progression.kind, next = progression.next, "series inferred");
        return RouterAction::Compute(Computation::new(trimmed, Ok(progression.next)));
    }

    tracing::debug!("delegating to remote solver");
    RouterAction::DelegateToRemoteSolver(trimmed.to_string())
}
