use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use chat_client::app::App;
use chat_client::client::ChatClient;
use chat_client::config::{Config, Overrides};
use chat_client::{handler, logging, tui, ui};

#[derive(Parser)]
#[command(name = "chat")]
#[command(version, about = "Terminal chat client for a remote chat service")]
struct Cli {
    /// Base URL of the chat service (serves /api/chat and /api/clear-chat)
    #[arg(long, env = "CHAT_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the effective base URL and timeout to the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => logging::default_log_path()?,
    };
    logging::init(&cli.log_level, &log_path)?;

    let mut config = Config::load().context("Failed to load config")?;
    let settings = config.settings(&Overrides {
        base_url: cli.base_url,
        timeout_secs: cli.timeout_secs,
    })?;

    if cli.save_config {
        config.remember(&settings);
        config.save().context("Failed to save config")?;
    }

    let client = ChatClient::new(&settings.base_url, settings.timeout)?;
    info!(
        chat = %client.chat_url(),
        clear = %client.clear_url(),
        timeout_secs = settings.timeout.as_secs(),
        "chat client starting"
    );

    let mut app = App::new(Arc::new(client), &settings);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    info!("chat client exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
