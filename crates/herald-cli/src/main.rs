mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "herald",
    about = "Post one generated local-news story a day to Telegram",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from herald.yaml)
    #[arg(long, global = true, env = "HERALD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily scheduler, the Telegram command poller and the
    /// optional control API
    Serve {
        /// Serve the control API on this port (overrides control.port)
        #[arg(long)]
        port: Option<u16>,

        /// Telegram bot token
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        telegram_token: Option<String>,

        /// API key for the text generator
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_api_key: Option<String>,

        /// Target chat id or @channel (default: the bot's own chat)
        #[arg(long, env = "CHANNEL_ID")]
        channel_id: Option<String>,

        /// Do not poll Telegram for /news, /stats and /start
        #[arg(long)]
        no_commands: bool,
    },

    /// Validate config, pools and persisted state
    Check,

    /// Show history sizes and the last dispatch
    Stats,

    /// Show when the next dispatch would fire
    Plan,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve {
            port,
            telegram_token,
            openai_api_key,
            channel_id,
            no_commands,
        } => cmd::serve::run(
            &root,
            cmd::serve::ServeArgs {
                port,
                telegram_token,
                openai_api_key,
                channel_id,
                no_commands,
            },
        ),
        Commands::Check => cmd::check::run(&root, cli.json),
        Commands::Stats => cmd::stats::run(&root, cli.json),
        Commands::Plan => cmd::plan::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
