//! Telegram command surface: `/start`, `/news`, `/stats`.
//!
//! Runs as a long-polling loop next to the scheduler. Replies go to the chat
//! the command came from. `/news` uses [`Executor::run_now`], so it neither
//! reads nor writes the dispatch ledger.

use std::sync::Arc;
use std::time::Duration;

use herald_agent::{ChatId, Message, TelegramClient, Update};
use tokio_util::sync::CancellationToken;

use crate::executor::Executor;
use crate::state::AppState;

const RETRY_BACKOFF: Duration = Duration::from_secs(5);

pub const HELP: &str = "👋 I post one piece of local news a day.\n\n\
/news - generate a story right now\n\
/stats - history and last dispatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    News,
    Stats,
}

/// Parse the leading bot command of a message, if any.
///
/// Accepts `/cmd`, `/cmd@botname` and trailing arguments.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    match name.to_ascii_lowercase().as_str() {
        "start" | "help" => Some(Command::Start),
        "news" => Some(Command::News),
        "stats" => Some(Command::Stats),
        _ => None,
    }
}

pub struct CommandPoller {
    state: AppState,
    executor: Executor,
    client: Arc<TelegramClient>,
    timeout_secs: u64,
}

impl CommandPoller {
    pub fn new(state: AppState, client: Arc<TelegramClient>, timeout_secs: u64) -> Self {
        Self {
            executor: Executor::new(state.clone()),
            state,
            client,
            timeout_secs,
        }
    }

    /// Poll until `cancel` fires. Transport errors are logged and retried.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!("listening for Telegram commands");
        let mut offset: Option<i64> = None;
        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.client.get_updates(offset, self.timeout_secs) => res,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, backing off");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_BACKOFF) => continue,
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }
        tracing::info!("command poller stopped");
    }

    pub async fn handle_update(&self, update: Update) {
        let Some(Message {
            chat,
            text: Some(text),
            ..
        }) = update.message
        else {
            return;
        };
        let Some(command) = parse_command(&text) else {
            return;
        };
        tracing::info!(chat = chat.id, ?command, "command received");

        let reply = self.respond(command).await;
        if let Err(e) = self.client.send_message(&ChatId::Id(chat.id), &reply).await {
            tracing::warn!(chat = chat.id, error = %e, "failed to reply to command");
        }
    }

    /// Build the reply text for `command`.
    pub async fn respond(&self, command: Command) -> String {
        match command {
            Command::Start => HELP.to_string(),
            Command::News => match self.executor.run_now().await {
                Ok(composed) => composed.text,
                Err(e) => {
                    tracing::error!(error = %e, "/news failed");
                    format!("❌ Error: {e}")
                }
            },
            Command::Stats => match self.state.stats() {
                Ok(stats) => stats.to_string(),
                Err(e) => format!("❌ Error: {e}"),
            },
        }
    }
}
