//! Engine for voxcalc: routing, shell state, history, and the remote solver.
//!
//! [`App`] owns one calculator session. Every call is synchronous except
//! [`App::next_remote_outcome`], the single point where the app waits on the
//! network. While a solve is outstanding the display reads `Thinking...`;
//! later input still applies, and whichever finishes last owns the display.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::oneshot;
use voxcalc_config::ResolvedConfig;
use voxcalc_core::{ScientificAction, Session, SessionEffects};
use voxcalc_providers::{RemoteSolver, SolverError, extract_answer};
use voxcalc_types::{Announcement, RouterAction, SettingChange, ShellState, truncate_chars};
use voxcalc_utils::sanitize_diagnostic;

mod commands;
mod history;
mod router;
mod speech;
mod voice;

pub use commands::{Command, CommandSpec, command_help_summary, command_specs};
pub use history::{History, HistoryError, render_export};
pub use router::route;
pub use speech::{ConsoleSpeaker, Recognition, SilentSpeaker, Speaker, SpeechError};
pub use voice::{Utterance, match_command};

/// Display text when the solver has no usable key.
pub const SET_API_KEY: &str = "Set API Key";
/// Characters of a solver diagnostic shown after `Err: `.
const DIAGNOSTIC_DISPLAY_CHARS: usize = 8;

/// How an outstanding remote solve ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Answered(String),
    MissingCredential,
    /// Redacted diagnostic.
    Failed(String),
}

struct PendingSolve {
    raw: String,
    receiver: oneshot::Receiver<Result<String, SolverError>>,
}

pub struct App {
    session: Session,
    shell: ShellState,
    history: History,
    speaker: Box<dyn Speaker>,
    solver: Arc<dyn RemoteSolver>,
    recognition: Recognition,
    narrate: bool,
    export_dir: PathBuf,
    known_secrets: Vec<String>,
    pending: Option<PendingSolve>,
    quit_requested: bool,
}

impl App {
    /// Narration on, recognition available, exports to the working directory.
    pub fn new(history: History, solver: Arc<dyn RemoteSolver>, speaker: Box<dyn Speaker>) -> Self {
        Self {
            session: Session::new(),
            shell: ShellState::default(),
            history,
            speaker,
            solver,
            recognition: Recognition::new(true),
            narrate: true,
            export_dir: PathBuf::from("."),
            known_secrets: Vec::new(),
            pending: None,
            quit_requested: false,
        }
    }

    /// Build from resolved configuration. An unreadable history file is
    /// logged and replaced by an in-memory history so it is never overwritten.
    pub fn from_config(
        config: &ResolvedConfig,
        solver: Arc<dyn RemoteSolver>,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        let history = History::load(&config.history.path).unwrap_or_else(|e| {
            tracing::warn!("history unavailable, not persisting this session: {e}");
            History::in_memory()
        });

        let mut app = Self::new(history, solver, speaker)
            .with_narration(config.narrate)
            .with_recognition(config.voice)
            .with_export_dir(config.history.export_dir.clone());
        app.shell.theme = config.theme;
        if let Some(key) = &config.solver.api_key {
            app.known_secrets.push(key.as_str().to_string());
        }
        tracing::info!(
            solver = app.solver.name(),
            history = app.history.len(),
            narrate = app.narrate,
            "app initialized"
        );
        app
    }

    #[must_use]
    pub fn with_narration(mut self, narrate: bool) -> Self {
        self.narrate = narrate;
        self
    }

    #[must_use]
    pub fn with_recognition(mut self, available: bool) -> Self {
        self.recognition = Recognition::new(available);
        self
    }

    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    #[must_use]
    pub fn display(&self) -> &str {
        self.session.display()
    }

    #[must_use]
    pub fn shell(&self) -> &ShellState {
        &self.shell
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.recognition.is_listening()
    }

    #[must_use]
    pub fn has_pending_solve(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    pub fn toggle_listening(&mut self) -> Result<bool, SpeechError> {
        self.recognition.toggle()
    }

    // ========================================================================
    // Voice
    // ========================================================================

    /// Route one transcript and apply the result. Returns a status line for
    /// actions whose effect is not visible on the display.
    ///
    /// Must be called inside a tokio runtime: delegation spawns a task.
    pub fn handle_utterance(&mut self, raw: &str) -> Option<String> {
        let action = route(raw, &self.shell, self.history.len());
        tracing::debug!(?action, "routed utterance");
        self.dispatch(action)
    }

    fn dispatch(&mut self, action: RouterAction) -> Option<String> {
        match action {
            RouterAction::NoOp => None,
            RouterAction::ClearSession => {
                self.session.clear();
                None
            }
            RouterAction::Navigate(view) => {
                self.shell.navigate(view);
                None
            }
            RouterAction::ToggleSetting(change) => {
                self.shell.apply_setting(change);
                (change == SettingChange::ChangeBackground)
                    .then(|| "Background change requested".to_string())
            }
            RouterAction::Compute(computation) => {
                let effects = self.session.apply_computation(computation);
                self.commit(effects);
                None
            }
            RouterAction::DelegateToRemoteSolver(text) => {
                self.delegate(text);
                None
            }
            RouterAction::ClearHistory => {
                self.history.clear();
                self.persist_history();
                self.say("History cleared");
                Some("History cleared".to_string())
            }
            RouterAction::ExportHistory(selection) => {
                match self.history.export(selection, &self.export_dir) {
                    Ok((path, count)) => {
                        self.say("Downloading history");
                        Some(format!("Exported {count} entries to {}", path.display()))
                    }
                    Err(e) => {
                        tracing::warn!("history export failed: {e}");
                        Some(format!("Export failed: {e}"))
                    }
                }
            }
            RouterAction::Inform(announcement) => {
                self.announce(announcement);
                None
            }
        }
    }

    fn announce(&mut self, announcement: Announcement) {
        let now = Local::now();
        let (display, spoken) = match announcement {
            Announcement::CurrentDate => {
                let date = now.format("%a %b %d %Y").to_string();
                let spoken = format!("Today is {date}");
                (date, spoken)
            }
            Announcement::CurrentTime => {
                let time = now.format("%-I:%M:%S %p").to_string();
                let spoken = format!("It is currently {time}");
                (time, spoken)
            }
            Announcement::HistoryCount => {
                let count = self.history.len();
                (
                    format!("{count} Records"),
                    format!("You have {count} calculations in history"),
                )
            }
        };
        self.session.show_message(&display);
        self.say(&spoken);
    }

    // ========================================================================
    // Remote solver
    // ========================================================================

    fn delegate(&mut self, raw: String) {
        let (tx, rx) = oneshot::channel();
        let solver = Arc::clone(&self.solver);
        let query = raw.clone();
        tokio::spawn(async move {
            let result = solver.solve(&query).await;
            // Receiver is gone when a newer delegation replaced it.
            let _ = tx.send(result);
        });

        tracing::info!(solver = self.solver.name(), "delegated to remote solver");
        if self
            .pending
            .replace(PendingSolve { raw, receiver: rx })
            .is_some()
        {
            tracing::debug!("superseded an outstanding solve");
        }
        self.session.show_thinking();
    }

    /// Wait for the outstanding solve and apply it. `None` when nothing is
    /// outstanding. Cancel-safe: dropping the future keeps the solve pending.
    pub async fn next_remote_outcome(&mut self) -> Option<RemoteOutcome> {
        let pending = self.pending.as_mut()?;
        let result = match (&mut pending.receiver).await {
            Ok(result) => result,
            Err(_) => Err(SolverError::Transport("solver task ended".to_string())),
        };
        let raw = self.pending.take().map(|p| p.raw).unwrap_or_default();
        Some(self.apply_remote_result(&raw, result))
    }

    fn apply_remote_result(
        &mut self,
        raw: &str,
        result: Result<String, SolverError>,
    ) -> RemoteOutcome {
        match result {
            Ok(reply) => {
                let answer = extract_answer(&reply);
                let effects = self.session.apply_remote_answer(raw, &answer);
                self.commit(effects);
                RemoteOutcome::Answered(answer)
            }
            Err(e) if e.is_credential_error() => {
                tracing::warn!(solver = self.solver.name(), "solver credential missing or rejected");
                self.session.show_message(SET_API_KEY);
                RemoteOutcome::MissingCredential
            }
            Err(e) => {
                let secrets: Vec<&str> = self.known_secrets.iter().map(String::as_str).collect();
                let diagnostic = sanitize_diagnostic(&e.to_string(), &secrets);
                tracing::warn!(solver = self.solver.name(), error = %diagnostic, "remote solve failed");
                self.session.show_message(&format!(
                    "Err: {}",
                    truncate_chars(&diagnostic, DIAGNOSTIC_DISPLAY_CHARS)
                ));
                RemoteOutcome::Failed(diagnostic)
            }
        }
    }

    // ========================================================================
    // Keypad
    // ========================================================================

    fn keypad_enabled(&self) -> bool {
        let enabled = self.shell.view.accepts_keypad();
        if !enabled {
            tracing::debug!(view = ?self.shell.view, "keypad ignored");
        }
        enabled
    }

    /// Press one keypad token. Returns false when the current view ignores
    /// the keypad.
    pub fn press(&mut self, token: &str) -> bool {
        if !self.keypad_enabled() {
            return false;
        }
        self.session.append(token);
        true
    }

    pub fn delete_last(&mut self) {
        if self.keypad_enabled() {
            self.session.delete_last();
        }
    }

    pub fn clear(&mut self) {
        if self.keypad_enabled() {
            self.session.clear();
        }
    }

    pub fn calculate(&mut self) {
        if self.keypad_enabled() {
            let effects = self.session.calculate();
            self.commit(effects);
        }
    }

    pub fn apply_action(&mut self, action: ScientificAction) {
        if self.keypad_enabled() {
            let effects = self.session.apply_unary_action(action);
            self.commit(effects);
        }
    }

    // ========================================================================
    // Effects
    // ========================================================================

    fn commit(&mut self, effects: SessionEffects) {
        if let Some(narration) = effects.narration {
            self.say(&narration);
        }
        if let Some(record) = effects.history {
            self.history.append(record);
            self.persist_history();
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.history.save() {
            tracing::warn!("failed to save history: {e}");
        }
    }

    fn say(&self, text: &str) {
        if self.narrate {
            self.speaker.speak(text);
        }
    }
}

#[cfg(test)]
mod tests;
