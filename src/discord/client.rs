//! Discord bot client.
//!
//! Builds the serenity client, keeps it connected with backoff and shuts
//! the shards down when asked to.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::cache::Settings as CacheSettings;
use serenity::http::HttpBuilder;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::common::error::Result;
use crate::config::types::DiscordConfig;
use crate::discord::commands::ShardManagerContainer;
use crate::discord::handler::RoutingHandler;
use crate::routing::EventRouter;

/// Longest wait between reconnection attempts.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Gateway intents the router needs.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
}

/// Exponential backoff for Discord reconnection.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Builder for creating the Discord bot.
pub struct DiscordBotBuilder {
    config: DiscordConfig,
    router: Arc<EventRouter>,
}

impl DiscordBotBuilder {
    pub fn new(config: DiscordConfig, router: Arc<EventRouter>) -> Self {
        Self { config, router }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> Result<DiscordBot> {
        let client = build_client(&self.config, self.router.clone()).await?;
        Ok(DiscordBot {
            client: Some(client),
            config: self.config,
            router: self.router,
        })
    }
}

async fn build_client(config: &DiscordConfig, router: Arc<EventRouter>) -> Result<Client> {
    let intents = intents();

    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let http = HttpBuilder::new(&config.token)
        .client(reqwest_client)
        .build();

    let mut cache_settings = CacheSettings::default();
    cache_settings.max_messages = config.message_cache_size;

    let handler = RoutingHandler::new(router, config.command_prefix.clone(), intents);
    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .cache_settings(cache_settings)
        .event_handler(handler)
        .await?;

    client
        .data
        .write()
        .await
        .insert::<ShardManagerContainer>(client.shard_manager.clone());

    Ok(client)
}

pub struct DiscordBot {
    client: Option<Client>,
    config: DiscordConfig,
    router: Arc<EventRouter>,
}

impl DiscordBot {
    /// Run until the gateway closes normally or `shutdown_rx` turns true.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match self.client.take() {
                Some(client) => client,
                None => match build_client(&self.config, self.router.clone()).await {
                    Ok(client) => {
                        backoff = discord_backoff();
                        client
                    }
                    Err(e) => {
                        error!("Failed to rebuild Discord client: {}", e);
                        if !Self::wait_or_shutdown(&mut backoff, &mut shutdown_rx).await {
                            break;
                        }
                        continue;
                    }
                },
            };

            let shard_manager = client.shard_manager.clone();
            tokio::select! {
                result = client.start() => match result {
                    Ok(()) => {
                        info!("Discord client disconnected normally");
                        break;
                    }
                    Err(e) => {
                        error!("Discord client error: {}", e);
                        if !Self::wait_or_shutdown(&mut backoff, &mut shutdown_rx).await {
                            break;
                        }
                    }
                },
                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("Initiating graceful Discord shutdown...");
                    shard_manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                    break;
                }
            }
        }
        info!("Discord task ended");
    }

    /// Sleep for the next backoff delay. Returns `false` if shutdown came first.
    async fn wait_or_shutdown(
        backoff: &mut impl Iterator<Item = Duration>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> bool {
        let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
        warn!("Discord disconnected. Reconnecting in {:.1}s...", delay.as_secs_f64());

        tokio::select! {
            _ = sleep(delay) => true,
            _ = wait_for_shutdown(shutdown_rx) => {
                info!("Shutdown signal received during backoff");
                false
            }
        }
    }
}

/// Resolves once the flag is set or the sender is gone.
async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_routed_events() {
        let intents = intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MEMBERS));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }

    #[test]
    fn test_backoff_is_bounded() {
        let delays: Vec<Duration> = discord_backoff().take(100).collect();
        assert_eq!(delays.len(), 100);
        // jitter may add up to one extra delay on top
        assert!(delays.iter().all(|d| *d <= MAX_RECONNECT_DELAY * 2));
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_returns_on_flag() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { wait_for_shutdown(&mut rx).await });
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_returns_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(&mut rx))
            .await
            .unwrap();
    }
}
