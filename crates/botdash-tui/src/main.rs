mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod error;
mod focus;
mod log_tail;
mod monitor;
mod playlist;
mod push;
mod session_ctl;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;

use botdash_proto::client::ApiClient;
use botdash_proto::config::Config;
use botdash_proto::session::SessionStore;

/// Terminal dashboard for a music bot server.
#[derive(Debug, Parser)]
#[command(name = "botdash", version)]
struct Args {
    /// Server root, e.g. http://127.0.0.1:5000 (overrides the config file).
    #[arg(long)]
    base_url: Option<String>,

    /// Poll only; never open the push channel.
    #[arg(long)]
    no_push: bool,

    /// Config file to load instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    if let Some(base_url) = args.base_url {
        config.server.base_url = base_url;
    }
    if args.no_push {
        config.push.enabled = false;
    }

    // ── Logging ──────────────────────────────────────────────────────────────
    let log_path = config.paths.log_file.clone();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep the HTTP client internals quiet.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("botdash log: {}", log_path.display());
    tracing::info!("botdash starting, server {}", config.server.base_url);

    // ── Controllers ──────────────────────────────────────────────────────────
    let client = ApiClient::new(&config.server.base_url)?;
    let store = SessionStore::new(config.paths.session_file.clone());
    let state = app_state::AppState::new(
        monitor::StatusPoller::new(config.monitor.series_capacity),
        log_tail::LogTail::new(config.monitor.max_log_lines, config.monitor.scroll_threshold),
        session_ctl::SessionController::new(store),
        config.server.base_url.clone(),
    );

    let push_url = if config.push.enabled {
        match config.push_url() {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("push channel disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(client, state, config.polling.clone(), push_url);
    app.run().await?;

    Ok(())
}
