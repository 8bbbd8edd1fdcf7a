//! Remote word-problem solver clients.
//!
//! The engine hands utterances it cannot compute locally to a
//! [`RemoteSolver`]. The only implementation talking to a real service is
//! [`gemini::GeminiSolver`]; tests substitute in-process fakes.
//!
//! # Error Handling
//!
//! Failures come back as [`SolverError`]. Callers only need two buckets:
//! [`SolverError::is_credential_error`] (the user must configure a key) and
//! everything else (shown as a short diagnostic). Nothing here retries.

pub mod gemini;

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Boxed future returned by [`RemoteSolver::solve`], keeping the trait
/// object-safe.
pub type SolveFut<'a> = Pin<Box<dyn Future<Output = Result<String, SolverError>> + Send + 'a>>;

/// A service that turns free text into a free-text answer.
pub trait RemoteSolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn solve<'a>(&'a self, text: &'a str) -> SolveFut<'a>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    #[error("API Key not configured")]
    MissingCredential,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("solver returned no answer")]
    EmptyResponse,
    #[error("malformed solver response: {0}")]
    Malformed(String),
}

impl SolverError {
    /// Whether the fix is configuring a (valid) API key.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        match self {
            SolverError::MissingCredential => true,
            SolverError::Http { status, body } => *status == 401 || is_auth_error(body),
            _ => false,
        }
    }
}

/// Heuristic match for provider authentication failures.
#[must_use]
pub fn is_auth_error(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    let mentions_key = lower.contains("api key") || lower.contains("api_key");
    let auth_words = lower.contains("invalid")
        || lower.contains("not valid")
        || lower.contains("missing")
        || lower.contains("unauthorized")
        || lower.contains("unauthenticated");

    lower.contains("api_key_invalid") || (mentions_key && auth_words)
}

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number literal regex"))
}

/// The last numeric literal in a reply, or the whole trimmed reply when it
/// has none.
#[must_use]
pub fn extract_answer(reply: &str) -> String {
    number_pattern()
        .find_iter(reply)
        .last()
        .map_or_else(|| reply.trim().to_string(), |m| m.as_str().to_string())
}

/// HTTP client for solver requests. HTTPS is enforced unless the base URL is
/// plain HTTP (local test servers).
pub fn http_client(timeout: Duration, https_only: bool) -> Result<reqwest::Client, SolverError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .build()
        .map_err(|e| SolverError::Transport(format!("HTTP client: {e}")))
}

/// Read an error body, keeping at most 32 KiB.
pub async fn read_capped_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
