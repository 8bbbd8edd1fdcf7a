//! Unit tests for the engine crate.

use std::sync::{Arc, Mutex};

use voxcalc_config::{ResolvedConfig, VoxcalcConfig};
use voxcalc_core::ScientificAction;
use voxcalc_providers::{RemoteSolver, SolveFut, SolverError};
use voxcalc_types::{THINKING_MARKER, View};

use super::*;

struct FakeSolver {
    reply: Result<String, SolverError>,
    queries: Mutex<Vec<String>>,
}

impl FakeSolver {
    fn answering(reply: &str) -> Arc<Self> {
        Self::with_reply(Ok(reply.to_string()))
    }

    fn failing(err: SolverError) -> Arc<Self> {
        Self::with_reply(Err(err))
    }

    fn with_reply(reply: Result<String, SolverError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

impl RemoteSolver for FakeSolver {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn solve<'a>(&'a self, text: &'a str) -> SolveFut<'a> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(text.to_string());
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}

#[derive(Clone, Default)]
struct RecordingSpeaker(Arc<Mutex<Vec<String>>>);

impl RecordingSpeaker {
    fn spoken(&self) -> Vec<String> {
        self.0.lock().expect("speaker lock").clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) {
        self.0.lock().expect("speaker lock").push(text.to_string());
    }
}

fn test_app(solver: Arc<FakeSolver>) -> (App, RecordingSpeaker) {
    let speaker = RecordingSpeaker::default();
    let app = App::new(History::in_memory(), solver, Box::new(speaker.clone()));
    (app, speaker)
}

fn local_app() -> (App, RecordingSpeaker) {
    test_app(FakeSolver::answering("unused"))
}

// ========================================================================
// Local computation
// ========================================================================

#[test]
fn spoken_percent_is_displayed_and_narrated() {
    let (mut app, speaker) = local_app();

    assert_eq!(app.handle_utterance("what is fifteen percent of eighty"), None);

    assert_eq!(app.display(), "12");
    assert_eq!(speaker.spoken(), vec!["The answer is twelve".to_string()]);
    let entry = app.history().item(1).expect("recorded");
    assert_eq!(entry.expression, "15%80");
    assert_eq!(entry.result, "12");
}

#[test]
fn digit_after_spoken_result_starts_fresh() {
    let (mut app, _) = local_app();
    app.handle_utterance("five plus three");
    assert_eq!(app.display(), "8");

    assert!(app.press("3"));
    assert_eq!(app.display(), "3");
}

#[test]
fn close_history_while_inactive_changes_nothing() {
    let (mut app, speaker) = local_app();
    app.press("7");

    app.handle_utterance("close history");

    assert_eq!(app.display(), "7");
    assert_eq!(app.shell().view, View::Standard);
    assert!(speaker.spoken().is_empty());
    assert!(app.history().is_empty());
}

#[test]
fn failed_local_calculation_shows_error_and_apologizes() {
    let (mut app, speaker) = local_app();
    app.handle_utterance("sqrt -4");
    assert_eq!(app.display(), "Error");
    assert_eq!(
        speaker.spoken(),
        vec!["There was an error in the calculation.".to_string()]
    );
    assert!(app.history().is_empty());
}

#[test]
fn scientific_action_records_labelled_history() {
    let (mut app, speaker) = local_app();
    app.press("9");
    app.apply_action(ScientificAction::Sqrt);

    assert_eq!(app.display(), "3");
    assert_eq!(speaker.spoken(), vec!["The answer is three".to_string()]);
    assert_eq!(
        app.history().item(1).map(|e| e.expression.as_str()),
        Some("sqrt(9)")
    );
}

#[test]
fn keypad_commands_drive_the_session() {
    let (mut app, _) = local_app();
    assert_eq!(app.process_command("key 12 + 30"), None);
    assert_eq!(app.display(), "12+30");
    assert_eq!(app.process_command("eq"), None);
    assert_eq!(app.display(), "42");
    app.process_command("c");
    assert_eq!(app.display(), "");
}

#[test]
fn keypad_is_ignored_outside_calculator_views() {
    let (mut app, _) = local_app();
    app.handle_utterance("show history");
    assert_eq!(app.shell().view, View::History);

    assert!(!app.press("1"));
    assert_eq!(app.display(), "");
    assert!(
        app.process_command("key 1")
            .is_some_and(|msg| msg.contains("History"))
    );
}

#[test]
fn narration_can_be_disabled() {
    let speaker = RecordingSpeaker::default();
    let mut app = App::new(
        History::in_memory(),
        FakeSolver::answering("unused"),
        Box::new(speaker.clone()),
    )
    .with_narration(false);

    app.handle_utterance("two times four");

    assert_eq!(app.display(), "8");
    assert!(speaker.spoken().is_empty());
}

// ========================================================================
// Shell commands
// ========================================================================

#[test]
fn menu_and_navigation_update_shell() {
    let (mut app, _) = local_app();
    app.handle_utterance("open menu");
    assert!(app.shell().sidebar_open);

    app.handle_utterance("graphing");
    assert_eq!(app.shell().view, View::Graphing);
    assert!(!app.shell().sidebar_open);

    app.handle_utterance("go back");
    assert_eq!(app.shell().view, View::Standard);
}

#[test]
fn history_count_is_announced() {
    let (mut app, speaker) = local_app();
    app.handle_utterance("two plus two");
    app.handle_utterance("how many calculations");

    assert_eq!(app.display(), "1 Records");
    assert_eq!(
        speaker.spoken().last().map(String::as_str),
        Some("You have 1 calculations in history")
    );
}

#[test]
fn clear_history_empties_the_store() {
    let (mut app, _) = local_app();
    app.handle_utterance("two plus two");
    assert_eq!(
        app.handle_utterance("clear history"),
        Some("History cleared".to_string())
    );
    assert!(app.history().is_empty());
}

#[test]
fn download_exports_selected_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _) = local_app();
    let mut app = app.with_export_dir(dir.path());
    app.handle_utterance("one plus one");
    app.handle_utterance("two plus two");

    let notice = app
        .handle_utterance("download last 1")
        .expect("export notice");
    assert!(notice.starts_with("Exported 1 entries to"));

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(files.len(), 1);
    let text = std::fs::read_to_string(files[0].path()).expect("read export");
    assert!(text.starts_with("Calculator History\n"));
    assert!(text.contains("1. 2+2 = 4"));
    assert!(!text.contains("1+1"));
}

#[test]
fn listening_without_recognition_is_reported() {
    let (app, _) = local_app();
    let mut app = app.with_recognition(false);
    assert_eq!(
        app.toggle_listening(),
        Err(SpeechError::RecognitionUnavailable)
    );
    assert_eq!(
        app.process_command("listen"),
        Some("Voice input not supported".to_string())
    );
    assert!(!app.is_listening());
}

#[test]
fn quit_command_sets_flag() {
    let (mut app, _) = local_app();
    assert!(!app.should_quit());
    app.process_command("quit");
    assert!(app.should_quit());
}

// ========================================================================
// Remote solver
// ========================================================================

#[tokio::test]
async fn delegated_answer_is_applied() {
    let solver = FakeSolver::answering("Sure! The answer is 3.");
    let (mut app, speaker) = test_app(solver.clone());
    let raw = "If I have 5 apples and eat 2, how many are left?";

    app.handle_utterance(raw);
    assert_eq!(app.display(), THINKING_MARKER);
    assert!(app.has_pending_solve());

    let outcome = app.next_remote_outcome().await;

    assert_eq!(outcome, Some(RemoteOutcome::Answered("3".to_string())));
    assert_eq!(app.display(), "3");
    assert!(!app.has_pending_solve());
    assert_eq!(speaker.spoken(), vec!["The answer is three".to_string()]);
    assert_eq!(solver.queries(), vec![raw.to_string()]);
    let entry = app.history().item(1).expect("recorded");
    assert_eq!(entry.expression, raw);
    assert_eq!(entry.result, "3");
}

#[tokio::test]
async fn missing_credential_asks_for_a_key() {
    let (mut app, speaker) = test_app(FakeSolver::failing(SolverError::MissingCredential));

    app.handle_utterance("how tall is a giraffe in meters");
    let outcome = app.next_remote_outcome().await;

    assert_eq!(outcome, Some(RemoteOutcome::MissingCredential));
    assert_eq!(app.display(), SET_API_KEY);
    assert!(speaker.spoken().is_empty());
    assert!(app.history().is_empty());
}

#[tokio::test]
async fn other_failures_show_a_short_diagnostic() {
    let (mut app, _) = test_app(FakeSolver::failing(SolverError::Http {
        status: 503,
        body: "overloaded".to_string(),
    }));

    app.handle_utterance("how tall is a giraffe in meters");
    let outcome = app.next_remote_outcome().await;

    assert_eq!(
        outcome,
        Some(RemoteOutcome::Failed("HTTP 503: overloaded".to_string()))
    );
    assert_eq!(app.display(), "Err: HTTP 503");
    assert!(app.history().is_empty());
}

#[tokio::test]
async fn newer_delegation_supersedes_older() {
    let solver = FakeSolver::answering("7");
    let (mut app, _) = test_app(solver.clone());

    app.handle_utterance("first riddle on trains");
    app.handle_utterance("second riddle on boats");
    let outcome = app.next_remote_outcome().await;

    assert_eq!(outcome, Some(RemoteOutcome::Answered("7".to_string())));
    assert_eq!(app.history().len(), 1);
    assert_eq!(
        app.history().item(1).map(|e| e.expression.as_str()),
        Some("second riddle on boats")
    );
    assert_eq!(app.next_remote_outcome().await, None);
}

#[tokio::test]
async fn no_outstanding_solve_yields_none() {
    let (mut app, _) = local_app();
    assert_eq!(app.next_remote_outcome().await, None);
}

// ========================================================================
// Configuration
// ========================================================================

#[test]
fn from_config_persists_history_under_home() {
    let home = tempfile::tempdir().expect("tempdir");
    let config = ResolvedConfig::resolve(VoxcalcConfig::default(), None, home.path());

    let mut app = App::from_config(
        &config,
        FakeSolver::answering("unused"),
        Box::new(SilentSpeaker),
    );
    app.handle_utterance("six times seven");
    assert_eq!(app.display(), "42");

    let reloaded = History::load(&config.history.path).expect("reload");
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.item(1).map(|e| e.result.as_str()), Some("42"));
}
