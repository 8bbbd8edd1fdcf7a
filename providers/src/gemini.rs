//! Google Gemini `generateContent` client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use voxcalc_types::{ApiKey, truncate_with_ellipsis};

use crate::{RemoteSolver, SolveFut, SolverError, http_client, read_capped_error_body};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
const LOG_PREVIEW_CHARS: usize = 120;

/// Calculator-assistant prompt with few-shot examples.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a calculator assistant. Solve the following math problem or word problem.
Return ONLY the numerical answer or the mathematical expression.
Do not include any explanation, text, or markdown formatting like ```.

Examples:
Input: "What is 2 plus 2?"
Output: 4

Input: "If I have 5 apples and eat 2, how many left?"
Output: 3

Input: "15% of 80"
Output: 12

Input: "Complete the series 2, 4, 8, 16"
Output: 32

Input: "{text}"
"#
    )
}

fn build_request_body(text: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(text) }]
        }]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first candidate, parts concatenated.
fn response_text(response: GenerateContentResponse) -> Result<String, SolverError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(SolverError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSolver {
    client: reqwest::Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

impl GeminiSolver {
    /// Build a solver. A missing key is accepted here and reported as
    /// [`SolverError::MissingCredential`] on each request.
    pub fn new(
        api_key: Option<ApiKey>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SolverError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = http_client(timeout, base_url.starts_with("https://"))?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url,
        })
    }

    pub fn with_defaults(api_key: Option<ApiKey>) -> Result<Self, SolverError> {
        Self::new(api_key, DEFAULT_MODEL, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(&self, text: &str) -> Result<String, SolverError> {
        let Some(api_key) = &self.api_key else {
            return Err(SolverError::MissingCredential);
        };

        tracing::debug!(model = %self.model, chars = text.chars().count(), "sending solver request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.as_str())
            .header("content-type", "application/json")
            .json(&build_request_body(text))
            .send()
            .await
            .map_err(|e| SolverError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(SolverError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SolverError::Malformed(e.without_url().to_string()))?;
        let reply = response_text(parsed)?;
        tracing::debug!(
            reply = %truncate_with_ellipsis(&reply, LOG_PREVIEW_CHARS),
            "solver replied"
        );
        Ok(reply)
    }
}

impl RemoteSolver for GeminiSolver {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn solve<'a>(&'a self, text: &'a str) -> SolveFut<'a> {
        Box::pin(self.request(text))
    }
}
