//! `herald-agent`: HTTP clients for the collaborators outside the daily
//! dispatch core.
//!
//! # Architecture
//!
//! ```text
//! (location, subject)
//!     │
//!     ▼
//! ContentGenerator   ← OpenAiGenerator: POST {api_base}/chat/completions
//!     │                 returns Generation::Text | Generation::Failed
//!     ▼
//! Deliverer          ← TelegramDeliverer: POST /bot<token>/sendMessage
//!                       errors propagate to the caller
//! ```
//!
//! `TelegramClient` also exposes `getUpdates` for the command poller.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use herald_agent::{ContentGenerator, Deliverer, OpenAiGenerator, OpenAiOptions};
//!
//! let generator = OpenAiGenerator::new(OpenAiOptions {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     ..Default::default()
//! })?;
//! let (text, _fallback) = generator
//!     .generate("Uglich", "marker")
//!     .await
//!     .text_or_fallback("Uglich", "marker");
//! ```

pub mod error;
pub mod generator;
pub mod telegram;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::AgentError;
pub use generator::{
    fallback_text, ContentGenerator, Generation, OpenAiGenerator, OpenAiOptions, DEFAULT_PROMPT,
};
pub use telegram::{Deliverer, TelegramClient, TelegramDeliverer};
pub use types::{ChatId, Message, Update, User};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AgentError>;
