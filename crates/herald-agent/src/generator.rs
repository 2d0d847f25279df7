use std::time::Duration;

use async_trait::async_trait;

use crate::types::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::{AgentError, Result};

// ─── Generation ───────────────────────────────────────────────────────────

/// Outcome of a content generation attempt.
///
/// Generation never fails the dispatch: callers map `Failed` to
/// [`fallback_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    Failed(String),
}

impl Generation {
    /// The generated text, or the deterministic fallback. The flag is `true`
    /// when the fallback was used.
    pub fn text_or_fallback(self, location: &str, subject: &str) -> (String, bool) {
        match self {
            Generation::Text(text) => (text, false),
            Generation::Failed(_) => (fallback_text(location, subject), true),
        }
    }
}

/// Minimal message used when the generator is unavailable.
pub fn fallback_text(location: &str, subject: &str) -> String {
    format!(
        "🚑 {location}: A local resident ended up in hospital after an unfortunate experiment with «{subject}»."
    )
}

/// Turns a location and a subject into a short piece of prose.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, location: &str, subject: &str) -> Generation;
}

// ─── Prompt ───────────────────────────────────────────────────────────────

pub const DEFAULT_PROMPT: &str = "\
Write a short sarcastic news item (3-4 sentences) about an absurd household mishap in Russia.

Requirements:
- Town: {location}
- Object: {subject}
- Describe how a resident of this town got into trouble with the object.
- Invent a fresh specific place and work it into the text naturally (no lists).
- Invent the specialist who came to help and work them in naturally (no lists).
- The outcome is random: successful (75%) or unsuccessful (25%).
- With 30% probability add a short funny quote in quotation marks.
- Start with a headline in the form: 🚑 {location}: [short summary].

Be witty and brief. Make every element unique on each run.";

/// Substitute `{location}` and `{subject}` in `template`.
pub fn render_prompt(template: &str, location: &str, subject: &str) -> String {
    template
        .replace("{location}", location)
        .replace("{subject}", subject)
}

// ─── OpenAiGenerator ──────────────────────────────────────────────────────

/// Settings for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct OpenAiOptions {
    /// Base URL without the trailing `/chat/completions`.
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Template override; [`DEFAULT_PROMPT`] when `None`.
    pub prompt: Option<String>,
    pub timeout: Duration,
}

impl Default for OpenAiOptions {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            temperature: 0.9,
            max_tokens: 500,
            prompt: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiGenerator {
    http: reqwest::Client,
    opts: OpenAiOptions,
}

impl OpenAiGenerator {
    pub fn new(opts: OpenAiOptions) -> Result<Self> {
        if opts.api_key.trim().is_empty() {
            return Err(AgentError::Config("generator API key is empty".into()));
        }
        let http = reqwest::Client::builder().timeout(opts.timeout).build()?;
        Ok(Self { http, opts })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.opts.api_base.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.opts.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.opts.temperature,
            max_tokens: self.opts.max_tokens,
        };
        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.opts.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(AgentError::GeneratorApi {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(|source| AgentError::Parse {
                what: "chat completion",
                source,
            })?;
        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(AgentError::EmptyCompletion)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(&self, location: &str, subject: &str) -> Generation {
        let template = self.opts.prompt.as_deref().unwrap_or(DEFAULT_PROMPT);
        let prompt = render_prompt(template, location, subject);
        match self.complete(prompt).await {
            Ok(text) => Generation::Text(text),
            Err(e) => {
                tracing::warn!(error = %e, "content generation failed");
                Generation::Failed(e.to_string())
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
