mod action;
mod auth;
mod config;
mod converters;
mod flow;
mod llm_client;
mod logging;
mod model_checks;
mod models;
mod request_id;
mod router;
mod schema;

use clap::Parser;
use config::{Config, ModelSettings};
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{Level, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "image-analyzer")]
#[command(about = "Upload a photo and get an AI description of its contents")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    ip: String,

    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Path to config file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Require this bearer token on /api/analyze
    #[arg(short, long)]
    token: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file (capped at 10 MiB)
    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,

    /// Ping the configured model and exit
    #[arg(long)]
    check: bool,
}

async fn watch_config_file(
    config_path: &str,
    settings: &Arc<RwLock<ModelSettings>>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(100);

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            if let Err(e) = tx.blocking_send(event) {
                eprintln!("Failed to send event: {}", e);
            }
        }
    })?;

    watcher.watch(Path::new(config_path), RecursiveMode::NonRecursive)?;

    while let Some(event) = rx.recv().await {
        if let EventKind::Modify(_) = event.kind {
            info!("Config file modified, attempting to reload");
            match Config::from_file(config_path) {
                Ok(new_config) => {
                    let mut current = settings.write().await;
                    if *current != new_config.model {
                        *current = new_config.model;
                        info!("Model settings reloaded, now using {}", current.model);
                    }
                }
                Err(e) => {
                    error!("Failed to reload configuration: {}", e);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", args.log_level);
        Level::INFO
    });
    logging::init_logging(log_level, args.log_file.as_deref());

    let config_path = args.config.clone();
    let config = Config::from_file(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", config_path, e))?;
    info!("Configuration loaded successfully from: {}", config_path);
    if config.model.api_key.is_empty() {
        warn!("No API key configured; set model.api_key or GEMINI_API_KEY");
    }
    let settings = Arc::new(RwLock::new(config.model));

    let client_builder = reqwest::Client::builder();
    let client_builder = match &args.proxy {
        Some(proxy) => client_builder.proxy(reqwest::Proxy::all(proxy)?),
        None => client_builder,
    };
    let http_client = Arc::new(client_builder.build()?);
    let gemini = llm_client::GeminiClient::new(http_client, settings.clone());

    if args.check {
        return model_checks::perform_model_check(&gemini).await;
    }

    let settings_for_watcher = settings.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_config_file(&config_path, &settings_for_watcher).await {
            warn!("Config file watcher error: {}", e);
        }
    });

    let app_state = auth::AppState {
        model: Arc::new(gemini),
        token: args.token,
    };
    let app = router::build_router(app_state);

    let bind_address = format!("{}:{}", args.ip, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server started on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
