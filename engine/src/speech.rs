//! Speech collaborators: text-to-speech output and recognition availability.

use std::io::{Write, stdout};

/// Vocalizes narration. Fire-and-forget: failures are the speaker's problem.
pub trait Speaker: Send {
    fn speak(&self, text: &str);
}

/// Writes narration to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&self, text: &str) {
        let mut out = stdout().lock();
        if let Err(e) = writeln!(out, "\u{1f50a} {text}") {
            tracing::debug!("speaker write failed: {e}");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, _text: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("Voice input not supported")]
    RecognitionUnavailable,
}

/// Listening state of the speech-to-text source.
///
/// Transcripts themselves arrive as plain lines; this only tracks whether
/// the source exists and whether the user asked it to listen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognition {
    available: bool,
    listening: bool,
}

impl Recognition {
    #[must_use]
    pub fn new(available: bool) -> Self {
        Self {
            available,
            listening: false,
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        self.available
    }

    #[must_use]
    pub fn is_listening(self) -> bool {
        self.listening
    }

    /// Flip listening on or off. Returns the new state.
    pub fn toggle(&mut self) -> Result<bool, SpeechError> {
        if !self.available {
            return Err(SpeechError::RecognitionUnavailable);
        }
        self.listening = !self.listening;
        Ok(self.listening)
    }
}
