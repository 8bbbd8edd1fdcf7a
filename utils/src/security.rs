//! Redaction for solver diagnostics.
//!
//! Remote-solver failures carry response bodies and transport messages that
//! can echo the request, including the API key. Everything that reaches the
//! log file or the display goes through [`sanitize_diagnostic`] first.
//!
//! Two passes run in order: pattern-based redaction of well-known key shapes
//! (`AIza…`, `key=` query parameters, bearer tokens), then value-based
//! redaction of secrets found in the environment and any keys the caller
//! knows about (the configured solver key).

use std::borrow::Cow;
use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;

/// Environment variable names whose values are treated as secrets.
pub const ENV_CREDENTIAL_PATTERNS: &[&str] = &[
    "*_API_KEY",
    "*_KEY",
    "*_TOKEN",
    "*_SECRET",
    "*_PASSWORD",
    "GEMINI_*",
    "GOOGLE_*",
];

/// Values shorter than this are never treated as secrets ("true", "1").
const MIN_SECRET_LENGTH: usize = 16;

const REDACTED: &str = "[REDACTED]";

/// Value-based redactor over a fixed set of secret strings.
pub struct SecretRedactor {
    secrets: Vec<String>,
    automaton: Option<AhoCorasick>,
}

impl std::fmt::Debug for SecretRedactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRedactor")
            .field("secret_count", &self.secrets.len())
            .finish_non_exhaustive()
    }
}

impl SecretRedactor {
    /// Scan the environment for credential-shaped variables.
    #[must_use]
    pub fn from_env() -> Self {
        let matcher = build_var_name_matcher();
        let secrets = std::env::vars()
            .filter(|(name, _)| matcher.is_match(name))
            .map(|(_, value)| value);
        Self::from_secrets(secrets)
    }

    /// Build from explicit secret values. Short and non-secret-looking values
    /// are dropped.
    #[must_use]
    pub fn from_secrets(values: impl IntoIterator<Item = String>) -> Self {
        let mut secrets: Vec<String> = values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| v.len() >= MIN_SECRET_LENGTH)
            .filter(|v| !looks_like_non_secret(v))
            .collect();

        // Longest first so overlapping secrets redact completely.
        secrets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        secrets.dedup();

        let automaton = if secrets.is_empty() {
            None
        } else {
            match AhoCorasickBuilder::new()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&secrets)
            {
                Ok(ac) => Some(ac),
                Err(e) => {
                    tracing::warn!(
                        secret_count = secrets.len(),
                        "secret automaton build failed; using sequential redaction ({e})"
                    );
                    None
                }
            }
        };

        tracing::debug!(secret_count = secrets.len(), "SecretRedactor initialized");
        Self { secrets, automaton }
    }

    #[must_use]
    pub fn redact<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if self.secrets.is_empty() {
            return Cow::Borrowed(input);
        }

        if let Some(ac) = &self.automaton {
            return Cow::Owned(ac.replace_all(input, &vec![REDACTED; self.secrets.len()]));
        }

        let mut output: Option<String> = None;
        for secret in &self.secrets {
            let haystack = output.as_deref().unwrap_or(input);
            if haystack.contains(secret.as_str()) {
                output = Some(haystack.replace(secret.as_str(), REDACTED));
            }
        }
        output.map_or(Cow::Borrowed(input), Cow::Owned)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

fn build_var_name_matcher() -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in ENV_CREDENTIAL_PATTERNS {
        if let Ok(glob) = GlobBuilder::new(pattern).case_insensitive(true).build() {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!("credential variable matcher failed to build ({e})");
        GlobSet::empty()
    })
}

/// Paths, plain URLs, and booleans are configuration, not secrets.
fn looks_like_non_secret(value: &str) -> bool {
    if value.starts_with('/') {
        return std::path::Path::new(value).exists();
    }
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return !(lower.contains('@') || lower.contains("key=") || lower.contains("token="));
    }
    value.chars().all(|c| c.is_ascii_digit()) && value.len() >= 20
}

static SECRET_REDACTOR: OnceLock<SecretRedactor> = OnceLock::new();

/// Process-wide redactor built from the environment on first use.
pub fn secret_redactor() -> &'static SecretRedactor {
    SECRET_REDACTOR.get_or_init(SecretRedactor::from_env)
}

struct PatternRedactor {
    gemini_key: Regex,
    key_param: Regex,
    goog_header: Regex,
    bearer: Regex,
}

impl PatternRedactor {
    fn new() -> Self {
        Self {
            gemini_key: Regex::new(r"AIza[0-9A-Za-z_-]+").expect("valid Gemini API key regex"),
            key_param: Regex::new(r"(?i)([?&]key=)[^&\s]+").expect("valid key parameter regex"),
            goog_header: Regex::new(r"(?i)(x-goog-api-key\s*[:=]\s*)\S+")
                .expect("valid API key header regex"),
            bearer: Regex::new(r"(?i)\b(Bearer)(\s+)[A-Za-z0-9._~+/=-]+")
                .expect("valid bearer token regex"),
        }
    }

    fn redact(&self, raw: &str) -> String {
        let mut output = raw.to_string();
        apply_if_match(&self.goog_header, "${1}[REDACTED]", &mut output);
        apply_if_match(&self.bearer, "${1}${2}[REDACTED]", &mut output);
        apply_if_match(&self.gemini_key, "AIza***", &mut output);
        apply_if_match(&self.key_param, "${1}[REDACTED]", &mut output);
        output
    }
}

fn apply_if_match(re: &Regex, replacement: &str, output: &mut String) {
    if !re.is_match(output) {
        return;
    }
    let replaced = re.replace_all(output.as_str(), replacement).into_owned();
    *output = replaced;
}

static PATTERN_REDACTOR: OnceLock<PatternRedactor> = OnceLock::new();

/// Redact well-known API key shapes.
#[must_use]
pub fn redact_api_keys(raw: &str) -> String {
    PATTERN_REDACTOR.get_or_init(PatternRedactor::new).redact(raw)
}

/// Drop control characters so a diagnostic stays on one display line.
fn strip_controls(raw: &str) -> Cow<'_, str> {
    if raw.chars().any(char::is_control) {
        Cow::Owned(
            raw.chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(raw)
    }
}

/// Sanitize a solver diagnostic for logging or display.
///
/// `known_secrets` are redacted by value in addition to environment secrets,
/// so a key loaded from the config file is covered too.
#[must_use]
pub fn sanitize_diagnostic(raw: &str, known_secrets: &[&str]) -> String {
    let flattened = strip_controls(raw.trim());
    let patterned = redact_api_keys(&flattened);
    let env_redacted = secret_redactor().redact(&patterned).into_owned();
    if known_secrets.is_empty() {
        return env_redacted;
    }
    let local = SecretRedactor::from_secrets(known_secrets.iter().map(|s| (*s).to_string()));
    local.redact(&env_redacted).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{SecretRedactor, looks_like_non_secret, redact_api_keys, sanitize_diagnostic};

    #[test]
    fn redact_api_keys_replaces_gemini_key() {
        let output = redact_api_keys("Error: AIzaSyC-abc123xyz key invalid");
        assert_eq!(output, "Error: AIza*** key invalid");
    }

    #[test]
    fn redact_api_keys_handles_key_query_param() {
        let output = redact_api_keys(
            "https://generativelanguage.googleapis.com/v1beta/models/x:generateContent?key=abc123&alt=json",
        );
        assert_eq!(
            output,
            "https://generativelanguage.googleapis.com/v1beta/models/x:generateContent?key=[REDACTED]&alt=json"
        );
    }

    #[test]
    fn redact_api_keys_handles_header_and_bearer() {
        let output = redact_api_keys("x-goog-api-key: abcdef Authorization: Bearer tok.en.value");
        assert_eq!(
            output,
            "x-goog-api-key: [REDACTED] Authorization: Bearer [REDACTED]"
        );
    }

    #[test]
    fn redact_api_keys_preserves_plain_text() {
        let input = "AI is cool and the answer is 42";
        assert_eq!(redact_api_keys(input), input);
    }

    #[test]
    fn secret_redactor_redacts_known_value() {
        let redactor = SecretRedactor::from_secrets(vec!["super_secret_value_12345".to_string()]);
        assert_eq!(
            redactor.redact("auth failed with super_secret_value_12345"),
            "auth failed with [REDACTED]"
        );
    }

    #[test]
    fn secret_redactor_prefers_longest_match() {
        let redactor = SecretRedactor::from_secrets(vec![
            "secret_value_abcdef".to_string(),
            "secret_value_abcdef_extended".to_string(),
        ]);
        assert_eq!(
            redactor.redact("x=secret_value_abcdef_extended"),
            "x=[REDACTED]"
        );
    }

    #[test]
    fn secret_redactor_ignores_short_values() {
        let redactor = SecretRedactor::from_secrets(vec!["true".to_string(), "1".to_string()]);
        assert!(redactor.is_empty());
        assert_eq!(redactor.redact("true 1"), "true 1");
    }

    #[test]
    fn secret_redactor_debug_hides_secrets() {
        let redactor = SecretRedactor::from_secrets(vec!["hidden_secret_value_999".to_string()]);
        let debug = format!("{redactor:?}");
        assert!(debug.contains("secret_count: 1"));
        assert!(!debug.contains("hidden_secret_value_999"));
    }

    #[test]
    fn looks_like_non_secret_skips_plain_urls() {
        assert!(looks_like_non_secret("https://generativelanguage.googleapis.com/v1beta"));
        assert!(!looks_like_non_secret("https://example.com/?key=abcdef0123456789"));
        assert!(!looks_like_non_secret("plainalphanumericvalue123"));
    }

    #[test]
    fn sanitize_diagnostic_redacts_known_key_and_controls() {
        let raw = "  invalid key custom-config-key-0123456789\nretry later ";
        let output = sanitize_diagnostic(raw, &["custom-config-key-0123456789"]);
        assert_eq!(output, "invalid key [REDACTED] retry later");
    }
}
