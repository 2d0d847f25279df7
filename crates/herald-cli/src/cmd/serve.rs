use anyhow::{anyhow, Context};
use herald_agent::{ChatId, OpenAiGenerator, OpenAiOptions, TelegramClient, TelegramDeliverer};
use herald_server::state::AppState;
use herald_server::DaemonOptions;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ServeArgs {
    pub port: Option<u16>,
    pub telegram_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub channel_id: Option<String>,
    pub no_commands: bool,
}

pub fn run(root: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let (config, pools) = super::load_project(root)?;

    let token = args
        .telegram_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("TELEGRAM_TOKEN is not set"))?;
    let api_key = args
        .openai_api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;

    let client = Arc::new(
        TelegramClient::new(config.telegram.api_base.clone(), token)
            .context("failed to build Telegram client")?,
    );
    let generator = OpenAiGenerator::new(OpenAiOptions {
        api_base: config.generator.api_base.clone(),
        api_key,
        model: config.generator.model.clone(),
        temperature: config.generator.temperature,
        max_tokens: config.generator.max_tokens,
        prompt: config.generator.prompt.clone(),
        ..OpenAiOptions::default()
    })
    .context("failed to build generator client")?;
    let target = args.channel_id.as_deref().and_then(ChatId::parse);
    let deliverer = TelegramDeliverer::new(Arc::clone(&client), target);

    let data_dir = config.data_dir(root);
    let state = AppState::new(pools, &data_dir, Arc::new(generator), Arc::new(deliverer))
        .with_window(config.window);

    tracing::info!(
        root = %root.display(),
        data_dir = %data_dir.display(),
        window = %config.window,
        "starting herald"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let control = match args.port.or(config.control.port) {
            Some(port) => Some(
                tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
                    .await
                    .with_context(|| format!("failed to bind control API on port {port}"))?,
            ),
            None => None,
        };
        let commands = (config.telegram.poll_commands && !args.no_commands)
            .then(|| (client, config.telegram.poll_timeout_secs));

        let cancel = CancellationToken::new();
        tokio::spawn(herald_server::cancel_on(
            tokio::signal::ctrl_c(),
            cancel.clone(),
        ));

        herald_server::run_daemon(state, DaemonOptions { commands, control }, cancel).await
    })
}
