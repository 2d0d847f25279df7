use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport failure. URLs are stripped so bot tokens never reach logs.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("generator returned {status}: {message}")]
    GeneratorApi { status: u16, message: String },

    #[error("generator returned no text")]
    EmptyCompletion,

    #[error("Telegram {method} failed ({}): {description}", status.map(|s| s.to_string()).unwrap_or_else(|| "no status".into()))]
    Telegram {
        method: &'static str,
        status: Option<u16>,
        description: String,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        AgentError::Http(e.without_url())
    }
}
