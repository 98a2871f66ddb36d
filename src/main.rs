//! Doorman - Discord event-routing bot
//!
//! Welcomes and says goodbye to members, moves questions into threads,
//! answers mentions and logs reactions.

mod common;
mod config;
mod discord;
mod routing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use config::{env::get_config_path, load_and_validate};
use discord::DiscordBotBuilder;
use routing::EventRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Doorman v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Set DOORMAN_DISCORD_TOKEN or provide {}.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Command prefix: {}", config.discord.command_prefix);
    info!("  Questions channel: {}", config.routing.questions_channel);
    info!("  Welcome channels: {:?}", config.routing.welcome_channels);
    info!("  Goodbye channels: {:?}", config.routing.goodbye_channels);

    let router = Arc::new(EventRouter::new(&config.routing));
    let bot = DiscordBotBuilder::new(config.discord.clone(), router)
        .build()
        .await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut discord_task = tokio::spawn(bot.run(shutdown_rx));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        match tokio::time::timeout(Duration::from_secs(5), discord_task).await {
            Ok(Ok(())) => info!("Discord client shut down gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
