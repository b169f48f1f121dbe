mod config;
mod content;
mod filter;
mod heartbeat;
mod platform;
mod relay;
mod routing;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::heartbeat::Heartbeat;
use crate::platform::telegram::TelegramPlatform;
use crate::platform::ChatPlatform;
use crate::relay::{RelayPipeline, RelayStats};

const DEFAULT_LOG_FILTER: &str = "info,tgrelay=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let auth_only = args.iter().any(|arg| arg == "--auth-only");
    let config_path = config::config_path(&args, std::env::var("CONFIG_FILE").ok());
    let loaded = Config::load(&config_path);

    let default_filter = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.general.log_filter.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Loading configuration from: {}", config_path.display());
    let config = loaded
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!("Configuration loaded successfully");
    for source in &config.forwarding.sources {
        info!("  Source: {}", source);
    }
    for destination in &config.forwarding.destinations {
        info!("  Destination: {}", destination);
    }

    let platform = Arc::new(TelegramPlatform::new(
        &config.telegram.bot_token,
        config.general.update_buffer,
    ));
    let me = platform.authorize().await?;
    info!("Authorized as {} ({})", me.display_name(), me.id);

    if auth_only {
        info!("--auth-only given, exiting after authorization");
        return Ok(());
    }

    let stats = Arc::new(RelayStats::default());
    let (mut pipeline, updates) =
        RelayPipeline::start(&config.forwarding, platform, stats.clone()).await?;

    let heartbeat = match Heartbeat::start(&config.general.heartbeat_cron, stats).await {
        Ok(heartbeat) => Some(heartbeat),
        Err(e) => {
            warn!("Heartbeat disabled: {:#}", e);
            None
        }
    };

    tokio::spawn(async {
        wait_for_shutdown().await;
        info!("Received shutdown signal, exiting");
        std::process::exit(1);
    });

    pipeline.run(updates).await;
    debug!("Relay ended in state {:?}", pipeline.state());
    if let Some(heartbeat) = heartbeat {
        heartbeat.stop().await?;
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            return ctrl_c().await;
        }
    };
    tokio::select! {
        _ = ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    ctrl_c().await
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
