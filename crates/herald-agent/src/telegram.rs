use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::OnceCell;

use crate::types::{ApiResponse, ChatId, Message, Update, User};
use crate::{AgentError, Result};

/// Bot API rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

// ─── TelegramClient ───────────────────────────────────────────────────────

/// Minimal Telegram Bot API client: identity, sending, long polling.
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AgentError::Config("Telegram bot token is empty".into()));
        }
        // Per-request timeouts are set on each call so long polls can outlive
        // ordinary requests.
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            token,
            request_timeout: Duration::from_secs(30),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.endpoint(method))
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(env) => env,
            Err(source) if status.is_success() => {
                return Err(AgentError::Parse {
                    what: "Telegram response",
                    source,
                })
            }
            Err(_) => {
                return Err(AgentError::Telegram {
                    method,
                    status: Some(status.as_u16()),
                    description: String::from_utf8_lossy(&bytes).into_owned(),
                })
            }
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } if status.is_success() => Ok(result),
            ApiResponse { description, .. } => Err(AgentError::Telegram {
                method,
                status: Some(status.as_u16()),
                description: description.unwrap_or_else(|| "no description".into()),
            }),
        }
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({}), self.request_timeout).await
    }

    /// Send `text` to `chat`, truncated to [`MAX_MESSAGE_CHARS`].
    pub async fn send_message(&self, chat: &ChatId, text: &str) -> Result<Message> {
        let body = json!({
            "chat_id": chat,
            "text": truncate_chars(text, MAX_MESSAGE_CHARS),
            "disable_web_page_preview": true,
        });
        self.call("sendMessage", body, self.request_timeout).await
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let timeout = Duration::from_secs(timeout_secs) + self.request_timeout;
        self.call("getUpdates", body, timeout).await
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

// ─── Deliverer ────────────────────────────────────────────────────────────

/// Publishes a finished piece of text. Errors must surface so the caller can
/// avoid recording a dispatch that never happened.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Delivers to a configured chat, or to the bot's own chat when none is set.
pub struct TelegramDeliverer {
    client: Arc<TelegramClient>,
    target: Option<ChatId>,
    own_chat: OnceCell<ChatId>,
}

impl TelegramDeliverer {
    pub fn new(client: Arc<TelegramClient>, target: Option<ChatId>) -> Self {
        Self {
            client,
            target,
            own_chat: OnceCell::new(),
        }
    }

    async fn resolve_target(&self) -> Result<ChatId> {
        if let Some(target) = &self.target {
            return Ok(target.clone());
        }
        let id = self
            .own_chat
            .get_or_try_init(|| async {
                let me = self.client.get_me().await?;
                tracing::info!(bot_id = me.id, "no channel configured, delivering to the bot's own chat");
                Ok::<_, AgentError>(ChatId::Id(me.id))
            })
            .await?;
        Ok(id.clone())
    }
}

#[async_trait]
impl Deliverer for TelegramDeliverer {
    async fn send(&self, text: &str) -> Result<()> {
        let target = self.resolve_target().await?;
        let msg = self.client.send_message(&target, text).await?;
        tracing::debug!(chat = %target, message_id = msg.message_id, "delivered");
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
